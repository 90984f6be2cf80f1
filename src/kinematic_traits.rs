extern crate nalgebra as na;

use na::{Isometry3, Vector3};
use crate::kinematics_error::KinematicsError;

/// Pose is used for the frames of the robot joints. It contains both Cartesian position
/// and rotation quaternion. The 4x4 homogeneous matrix is available as `pose.to_homogeneous()`.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5);
/// let frame = Pose::from_parts(translation, rotation);
/// let matrix = frame.to_homogeneous(); // 4x4
/// ```
pub type Pose = Isometry3<f64>;

/// Cartesian position in meters.
pub type Position = Vector3<f64>;

/// Joint angles in radians, one slot per chain position (fixed joints included).
pub type Joints = Vec<f64>;

/// Which of the two frames of a joint is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Cumulative pure Denavit-Hartenberg frame.
    Dh,
    /// DH frame with the mechanical offset of the joint applied.
    Actual,
}

/// Frames of all joints, from base to the end effector.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPoses {
    /// `dh[i]` is the cumulative DH frame from base to joint i.
    pub dh: Vec<Pose>,
    /// `actual[i] = dh[i] * offset[i]`, the physical joint frame.
    pub actual: Vec<Pose>,
}

impl JointPoses {
    pub fn len(&self) -> usize {
        self.dh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dh.is_empty()
    }

    pub fn frames(&self, kind: FrameKind) -> &[Pose] {
        match kind {
            FrameKind::Dh => &self.dh,
            FrameKind::Actual => &self.actual,
        }
    }

    /// Actual frame of the last joint, if any.
    pub fn end_effector(&self) -> Option<&Pose> {
        self.actual.last()
    }
}

/// Axes (x, y, z) of the frame, taken from the rotation columns.
pub fn frame_axes(pose: &Pose) -> [Vector3<f64>; 3] {
    let rotation = pose.rotation.to_rotation_matrix();
    let m = rotation.matrix();
    [
        m.column(0).into_owned(),
        m.column(1).into_owned(),
        m.column(2).into_owned(),
    ]
}

pub trait Kinematics {
    /// Number of joints, the required length of the joint angle vector.
    fn dof(&self) -> usize;

    /// Pure DH and actual frames of every joint for the given angles.
    fn forward_with_joint_poses(&self, joints: &[f64]) -> Result<JointPoses, KinematicsError>;

    /// Actual frame of the last joint (the end effector).
    fn forward(&self, joints: &[f64]) -> Result<Pose, KinematicsError> {
        let poses = self.forward_with_joint_poses(joints)?;
        poses.end_effector().copied().ok_or(KinematicsError::EmptyChain)
    }
}
