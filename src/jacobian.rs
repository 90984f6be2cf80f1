extern crate nalgebra as na;
use na::{DVector, Matrix3, Matrix3xX, Vector3};
use na::linalg::SVD;
use crate::kinematic_traits::{Joints, Kinematics};
use crate::kinematics_error::{check_dimension, KinematicsError};

/// Default disturbance of the joint angle for numerical differentiation, radians.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Struct representing the positional Jacobian matrix
pub struct Jacobian {
    /// A 3xN matrix representing the Jacobian
    ///
    /// The Jacobian matrix maps the joint velocities to the end-effector linear velocity.
    /// Each column corresponds to a joint, each row to one Cartesian axis.
    /// Columns of fixed joints are zero.
    matrix: Matrix3xX<f64>,

    /// The disturbance value used for computing the Jacobian
    epsilon: f64,
}

impl Jacobian {
    /// Constructs a new Jacobian struct by computing the Jacobian matrix for the given robot and joint configuration
    ///
    /// # Arguments
    ///
    /// * `robot` - A reference to the robot implementing the Kinematics trait
    /// * `joints` - The joint configuration, one value per joint
    /// * `epsilon` - A small value used for numerical differentiation
    pub fn new(robot: &impl Kinematics, joints: &[f64], epsilon: f64) -> Result<Self, KinematicsError> {
        let matrix = compute_jacobian(robot, joints, epsilon)?;
        Ok(Self { matrix, epsilon })
    }

    pub fn matrix(&self) -> &Matrix3xX<f64> {
        &self.matrix
    }

    /// Computes the joint velocities required to achieve a desired end-effector linear velocity
    ///
    /// # Returns
    ///
    /// `Result<Joints, &'static str>` - Joint positions, with values representing joint velocities rather than angles,
    /// or an error message if the computation fails.
    ///
    /// The SVD pseudoinverse is used as the matrix is not square in general. Singular values below
    /// the differentiation epsilon are treated as zero.
    pub fn velocities(&self, desired_end_effector_velocity: &Vector3<f64>) -> Result<Joints, &'static str> {
        let svd = SVD::new(self.matrix.clone(), true, true);
        match svd.pseudo_inverse(self.epsilon) {
            Ok(jacobian_pseudoinverse) => {
                let joint_velocities = jacobian_pseudoinverse * desired_end_effector_velocity;
                Ok(joint_velocities.iter().copied().collect())
            }
            Err(_) => Err("Unable to compute the pseudoinverse of the Jacobian matrix"),
        }
    }

    /// Damped least squares mapping of the Cartesian error to joint space:
    /// solves `(J·Jᵗ + damping·I) δx = error` and returns `Jᵗ δx`.
    ///
    /// The damping keeps the 3x3 system invertible near singular configurations. Returns `None`
    /// if the system still cannot be solved at working precision.
    pub fn damped_least_squares(&self, error: &Vector3<f64>, damping: f64) -> Option<DVector<f64>> {
        let damped: Matrix3<f64> = &self.matrix * self.matrix.transpose() + Matrix3::identity() * damping;
        let delta_x = damped.lu().solve(error)?;
        if !delta_x.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(self.matrix.transpose() * delta_x)
    }

    /// Computes the joint torques that balance the desired linear force at the end effector
    ///
    /// # Returns
    ///
    /// Joint positions, with values representing joint torques.
    pub fn forces(&self, desired_force: &Vector3<f64>) -> Joints {
        let joint_torques = self.matrix.transpose() * desired_force;
        joint_torques.iter().copied().collect()
    }
}

/// Function to compute the positional Jacobian matrix for a given robot and joint configuration
///
/// # Arguments
///
/// * `robot` - A reference to the robot implementing the Kinematics trait
/// * `joints` - The joint configuration
/// * `epsilon` - A small value used for numerical differentiation
///
/// # Returns
///
/// A 3xN matrix where column i is the forward difference of the end-effector position
/// with respect to joint i. Takes N+1 forward evaluations.
pub fn compute_jacobian(robot: &impl Kinematics, joints: &[f64], epsilon: f64) -> Result<Matrix3xX<f64>, KinematicsError> {
    check_dimension("joint angles", robot.dof(), joints.len())?;
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(KinematicsError::InvalidParameter(
            format!("Jacobian epsilon must be positive, got {}", epsilon)));
    }

    let current_position = robot.forward(joints)?.translation.vector;
    let mut jacobian = Matrix3xX::zeros(joints.len());
    let mut perturbed_qs = joints.to_vec();

    for i in 0..joints.len() {
        perturbed_qs[i] += epsilon;
        let perturbed_position = robot.forward(&perturbed_qs)?.translation.vector;
        perturbed_qs[i] = joints[i];

        jacobian.set_column(i, &((perturbed_position - current_position) / epsilon));
    }

    Ok(jacobian)
}
