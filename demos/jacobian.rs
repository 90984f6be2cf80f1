use nalgebra::Vector3;
use rs_dh_kinematics::jacobian::{Jacobian, DEFAULT_EPSILON};
use rs_dh_kinematics::kinematics_impl::DHKinematics;
use rs_dh_kinematics::parameters::dh_kinematics::Parameters;

/// Calculating Jacobian matrices for kinematic analysis.
fn main() {
    let robot = DHKinematics::new(Parameters::puma_560()).expect("Valid chain");
    let joints = [0.0, 0.3, -0.4, 0.2, 0.5, 0.0];

    let jacobian = Jacobian::new(&robot, &joints, DEFAULT_EPSILON).expect("Six joints");
    println!("Jacobian: {}", jacobian.matrix());

    // Move the end effector along y with 0.1 m/s.
    let joint_velocities = jacobian.velocities(&Vector3::new(0.0, 0.1, 0.0));
    println!("Computed joint velocities: {:?}", joint_velocities.unwrap());

    // 10 N pushing down at the end effector.
    let joint_torques = jacobian.forces(&Vector3::new(0.0, 0.0, -10.0));
    println!("Computed joint torques: {:?}", joint_torques);

    // The same step as the IK solver takes.
    let step = jacobian.damped_least_squares(&Vector3::new(0.01, 0.0, 0.0), 0.1);
    println!("Damped least squares step: {:?}", step);
}
