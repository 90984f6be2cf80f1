//! Coarse reachability estimate. The test is a sphere around the base frame with the radius
//! of the summed link lengths, so it is a necessary but not sufficient condition: targets
//! inside may still be unreachable (joint axes, fixed joints, holes in the workspace).

use crate::kinematic_traits::Position;
use crate::kinematics_impl::DHKinematics;

/// Targets up to this multiple of the maximal reach are reported as likely reachable.
pub const DEFAULT_REACH_MARGIN: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reachability {
    pub likely_reachable: bool,

    /// Distance of the target from the base origin, meters.
    pub distance_from_base: f64,

    /// Sum of |a| + |d| over all joints, meters.
    pub max_reach: f64,
}

pub fn check_reachability(robot: &DHKinematics, target: &Position) -> Reachability {
    check_reachability_with_margin(robot, target, DEFAULT_REACH_MARGIN)
}

pub fn check_reachability_with_margin(robot: &DHKinematics, target: &Position, margin: f64) -> Reachability {
    let distance_from_base = target.norm();
    let max_reach = robot.max_reach();
    Reachability {
        likely_reachable: distance_from_base <= max_reach * margin,
        distance_from_base,
        max_reach,
    }
}
