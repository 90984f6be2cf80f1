//! Rust implementation of forward kinematics and numerical inverse kinematics for serial arms
//! described by the standard Denavit-Hartenberg convention.
//!
//! The arm is a chain of joints, each described by one DH row (`theta`, `alpha`, `d`, `a`) and
//! an optional fixed mechanical offset applied after the DH transform. The theta of each row
//! is either a constant (fixed joint) or taken from the joint angle vector (variable joint).
//!
//! # Features
//!
//! - Forward kinematics returning both the pure DH frames and the actual (offset) frames of
//!   every joint, as `nalgebra::Isometry3`.
//! - Numerical position Jacobian by forward differences, with velocity and torque helpers.
//! - Damped least squares (Levenberg-Marquardt style) inverse kinematics for the end effector
//!   position, with iteration-by-iteration diagnostics and a cancellation flag.
//! - Coarse reachability check against the total link length.
//! - Line codec to exchange joint angles with the device.
//! - Reading chain descriptions and solver settings from YAML (feature `allow_filesystem`,
//!   `deg(angle)` is understood).
//!
//! Solving never changes the chain: [chain::KinematicChain::solve] proposes joint angles and
//! [chain::KinematicChain::apply] commits them.
//!
//! ## Examples
//!
//! - **basic.rs**: Forward kinematics, reachability and inverse kinematics on a 3-DOF arm.
//! - **jacobian.rs**: Jacobian matrix, joint velocities and torques.
//! - **from_yaml.rs**: Loading the chain from YAML and sending the solution to the device.

pub mod parameters;
pub mod parameters_robots;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;
#[cfg(feature = "allow_filesystem")]
pub mod parameter_error;

pub mod utils;
pub mod kinematic_traits;
pub mod kinematics_error;
pub mod kinematics_impl;

pub mod chain;

pub mod jacobian;

pub mod ik_solver;

pub mod reachability;

pub mod joint_command;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
