//! Errors for structural contract violations of the kinematic chain

/// Failures that are fatal at the boundary call. Numerical trouble while iterating
/// (singular configurations, no convergence) is never reported through this type,
/// see [crate::ik_solver::Termination] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Lengths of DH rows, offsets and/or joint angles disagree.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },
    /// The chain must have at least one joint.
    EmptyChain,
    /// Joint index is not within the chain.
    JointIndexOutOfRange { index: usize, dof: usize },
    /// Attempt to set the angle of a joint that has a fixed DH theta.
    FixedJoint(usize),
    /// Solver or Jacobian parameter outside of its allowed range.
    InvalidParameter(String),
}

impl std::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            KinematicsError::DimensionMismatch { what, expected, found } =>
                write!(f, "Dimension mismatch: expected {} {}, found {}", expected, what, found),
            KinematicsError::EmptyChain =>
                write!(f, "Kinematic chain must contain at least one joint"),
            KinematicsError::JointIndexOutOfRange { index, dof } =>
                write!(f, "Joint index {} out of range, chain has {} joints", index, dof),
            KinematicsError::FixedJoint(index) =>
                write!(f, "Joint {} has a fixed DH theta and cannot be set", index),
            KinematicsError::InvalidParameter(ref msg) =>
                write!(f, "Invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for KinematicsError {}

/// Fails with `DimensionMismatch` unless `found == expected`.
pub(crate) fn check_dimension(what: &'static str, expected: usize, found: usize) -> Result<(), KinematicsError> {
    if expected != found {
        return Err(KinematicsError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}
