use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use crate::kinematic_traits::{JointPoses, Kinematics, Pose};
use crate::kinematics_error::{check_dimension, KinematicsError};
use crate::parameters::dh_kinematics::{DhRow, Offset, Parameters};

/// Standard Denavit-Hartenberg transform Rz(theta) * Tz(d) * Tx(a) * Rx(alpha).
/// The rotation block is
/// ```text
/// | cθ  -sθ·cα   sθ·sα |
/// | sθ   cθ·cα  -cθ·sα |
/// | 0    sα      cα    |
/// ```
/// and the translation column is (a·cθ, a·sθ, d).
pub fn dh_transform(a: f64, d: f64, alpha: f64, theta: f64) -> Pose {
    let (st, ct) = theta.sin_cos();
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), theta)
        * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), alpha);
    Isometry3::from_parts(Translation3::new(a * ct, a * st, d), rotation)
}

/// Forward kinematics of the DH chain, returning both the pure DH and the actual (offset)
/// frames of every joint. Pure function of its inputs, so it can be called with perturbed
/// angles without touching any chain state.
///
/// The effective angle of the joint is the literal theta of its DH row if fixed, otherwise
/// the corresponding value from `joints`.
pub fn forward_kinematics(rows: &[DhRow], offsets: &[Offset], joints: &[f64])
                          -> Result<JointPoses, KinematicsError> {
    check_dimension("offsets", rows.len(), offsets.len())?;
    check_dimension("joint angles", rows.len(), joints.len())?;
    let offsets: Vec<Isometry3<f64>> = offsets.iter().map(Offset::to_isometry).collect();
    Ok(evaluate(rows, &offsets, joints))
}

/// Evaluation over already validated slices of equal length.
fn evaluate(rows: &[DhRow], offsets: &[Isometry3<f64>], joints: &[f64]) -> JointPoses {
    let mut dh = Vec::with_capacity(rows.len());
    let mut actual = Vec::with_capacity(rows.len());
    let mut cumulative = Isometry3::identity();

    for ((row, offset), &joint) in rows.iter().zip(offsets).zip(joints) {
        cumulative *= dh_transform(row.a, row.d, row.alpha, row.effective_theta(joint));
        dh.push(cumulative);
        actual.push(cumulative * offset);
    }
    JointPoses { dh, actual }
}

/// Kinematic description of the chain: DH rows, offsets and the resolved set
/// of variable joints. Holds no joint angles, see [crate::chain::KinematicChain] for that.
#[derive(Debug, Clone)]
pub struct DHKinematics {
    parameters: Parameters,

    /// Offsets are constant, precomputed as isometries.
    offsets: Vec<Isometry3<f64>>,

    /// Indices of the joints with variable theta.
    variable: Vec<usize>,
}

impl DHKinematics {
    /// Creates the chain description, failing if there are no joints or the number
    /// of offsets differs from the number of DH rows.
    pub fn new(parameters: Parameters) -> Result<Self, KinematicsError> {
        if parameters.dh.is_empty() {
            return Err(KinematicsError::EmptyChain);
        }
        check_dimension("offsets", parameters.dh.len(), parameters.offsets.len())?;

        let offsets = parameters.offsets.iter().map(Offset::to_isometry).collect();
        let variable = parameters.dh.iter().enumerate()
            .filter(|(_, row)| row.is_variable())
            .map(|(i, _)| i)
            .collect();

        Ok(DHKinematics { parameters, offsets, variable })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn rows(&self) -> &[DhRow] {
        &self.parameters.dh
    }

    /// Indices of the actuated joints, ascending.
    pub fn variable_joints(&self) -> &[usize] {
        &self.variable
    }

    pub fn is_variable(&self, joint: usize) -> bool {
        self.variable.binary_search(&joint).is_ok()
    }

    /// Upper bound of the arm extension: sum of |a| + |d| over all joints.
    pub fn max_reach(&self) -> f64 {
        self.parameters.dh.iter().map(|row| row.a.abs() + row.d.abs()).sum()
    }

    /// Frames for joint angles whose length the caller has already checked.
    pub(crate) fn evaluate_unchecked(&self, joints: &[f64]) -> JointPoses {
        evaluate(&self.parameters.dh, &self.offsets, joints)
    }
}

impl Kinematics for DHKinematics {
    fn dof(&self) -> usize {
        self.parameters.dh.len()
    }

    fn forward_with_joint_poses(&self, joints: &[f64]) -> Result<JointPoses, KinematicsError> {
        check_dimension("joint angles", self.dof(), joints.len())?;
        Ok(self.evaluate_unchecked(joints))
    }

    /// End effector only, without collecting the intermediate frames.
    fn forward(&self, joints: &[f64]) -> Result<Pose, KinematicsError> {
        check_dimension("joint angles", self.dof(), joints.len())?;
        let rows = &self.parameters.dh;
        let dh = rows.iter().zip(joints).fold(Isometry3::identity(), |cumulative, (row, &joint)| {
            cumulative * dh_transform(row.a, row.d, row.alpha, row.effective_theta(joint))
        });
        Ok(dh * self.offsets[rows.len() - 1])
    }
}
