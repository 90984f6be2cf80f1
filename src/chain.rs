//! The kinematic chain with its current joint angles.
//!
//! [KinematicChain] is the single owner of the joint angle vector. Visualization and device
//! feedback read and overwrite the angles through it; the IK solver only proposes
//! new angles that the caller commits with [KinematicChain::apply].
//!
//! ```
//! use rs_dh_kinematics::chain::KinematicChain;
//! use rs_dh_kinematics::ik_solver::DlsParameters;
//! use rs_dh_kinematics::kinematics_impl::DHKinematics;
//! use rs_dh_kinematics::parameters::dh_kinematics::Parameters;
//! use nalgebra::Vector3;
//!
//! let robot = DHKinematics::new(Parameters::planar_3dof()).unwrap();
//! let mut chain = KinematicChain::new(robot);
//! let target = Vector3::new(1.0, 0.5, 0.5);
//!
//! let solution = chain.solve(&target, &DlsParameters::default()).unwrap();
//! if solution.converged {
//!     chain.apply(&solution).unwrap();
//! }
//! ```

use nalgebra::Vector3;
use crate::ik_solver::{DlsParameters, DlsSolver, IkSolution};
use crate::kinematic_traits::{frame_axes, FrameKind, JointPoses, Kinematics, Pose, Position};
use crate::kinematics_error::{check_dimension, KinematicsError};
use crate::kinematics_impl::DHKinematics;
use crate::reachability::{check_reachability, Reachability};
use crate::utils::{as_radians, is_valid};

#[derive(Debug, Clone)]
pub struct KinematicChain {
    kinematics: DHKinematics,

    /// Radians, one slot per joint. Slots of fixed joints are kept but ignored.
    joints: Vec<f64>,

    /// Always in sync with `joints`, recomputed fully on every change.
    poses: JointPoses,
}

impl KinematicChain {
    /// Chain with all joint angles at zero.
    pub fn new(kinematics: DHKinematics) -> Self {
        let joints = vec![0.0; kinematics.dof()];
        let poses = kinematics.evaluate_unchecked(&joints);
        KinematicChain { kinematics, joints, poses }
    }

    pub fn kinematics(&self) -> &DHKinematics {
        &self.kinematics
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Current joint angles, radians.
    pub fn joints(&self) -> &[f64] {
        &self.joints
    }

    /// Current joint angles converted to degrees.
    pub fn joints_degrees(&self) -> Vec<f64> {
        self.joints.iter().map(|j| j.to_degrees()).collect()
    }

    pub fn joint_poses(&self) -> &JointPoses {
        &self.poses
    }

    /// Actual frame of the last joint.
    pub fn end_effector(&self) -> Pose {
        // The chain is never empty, DHKinematics::new rejects that.
        self.poses.actual[self.poses.len() - 1]
    }

    /// Sets the angle of a single variable joint.
    pub fn set_joint(&mut self, index: usize, value: f64) -> Result<(), KinematicsError> {
        self.check_settable(index)?;
        check_finite(&[value])?;
        self.joints[index] = value;
        self.update_poses();
        Ok(())
    }

    /// Moves a single variable joint by `delta` radians.
    pub fn jog(&mut self, index: usize, delta: f64) -> Result<(), KinematicsError> {
        self.check_settable(index)?;
        check_finite(&[self.joints[index] + delta])?;
        self.joints[index] += delta;
        self.update_poses();
        Ok(())
    }

    /// Overwrites all joint angles (radians), for instance from hardware feedback.
    pub fn set_joints(&mut self, joints: &[f64]) -> Result<(), KinematicsError> {
        check_dimension("joint angles", self.dof(), joints.len())?;
        check_finite(joints)?;
        self.joints.copy_from_slice(joints);
        self.update_poses();
        Ok(())
    }

    /// Overwrites all joint angles given in degrees.
    pub fn set_joints_degrees(&mut self, degrees: &[f64]) -> Result<(), KinematicsError> {
        self.set_joints(&as_radians(degrees))
    }

    /// Position of the joint frame, `None` if there is no such joint.
    pub fn joint_position(&self, index: usize, kind: FrameKind) -> Option<Position> {
        self.poses.frames(kind).get(index).map(|pose| pose.translation.vector)
    }

    /// x, y and z axes of the joint frame, `None` if there is no such joint.
    pub fn joint_axes(&self, index: usize, kind: FrameKind) -> Option<[Vector3<f64>; 3]> {
        self.poses.frames(kind).get(index).map(frame_axes)
    }

    /// Runs the damped least squares solver seeded from the current angles. The chain
    /// itself is not modified.
    pub fn solve(&self, target: &Position, parameters: &DlsParameters) -> Result<IkSolution, KinematicsError> {
        DlsSolver::new(*parameters).solve_from(&self.kinematics, target, &self.joints)
    }

    /// Commits the angles proposed by the solver, converged or best effort.
    pub fn apply(&mut self, solution: &IkSolution) -> Result<(), KinematicsError> {
        self.set_joints(&solution.joints)
    }

    /// Coarse check of the target against the total link length.
    pub fn check_reachability(&self, target: &Position) -> Reachability {
        check_reachability(&self.kinematics, target)
    }

    fn check_settable(&self, index: usize) -> Result<(), KinematicsError> {
        if index >= self.dof() {
            return Err(KinematicsError::JointIndexOutOfRange { index, dof: self.dof() });
        }
        if !self.kinematics.is_variable(index) {
            return Err(KinematicsError::FixedJoint(index));
        }
        Ok(())
    }

    fn update_poses(&mut self) {
        self.poses = self.kinematics.evaluate_unchecked(&self.joints);
    }
}

fn check_finite(joints: &[f64]) -> Result<(), KinematicsError> {
    if is_valid(joints) {
        Ok(())
    } else {
        Err(KinematicsError::InvalidParameter(format!("joint angles {:?} are not finite", joints)))
    }
}
