use nalgebra::Vector3;
use rs_dh_kinematics::chain::KinematicChain;
use rs_dh_kinematics::ik_solver::DlsParameters;
use rs_dh_kinematics::kinematic_traits::FrameKind;
use rs_dh_kinematics::kinematics_impl::DHKinematics;
use rs_dh_kinematics::parameters::dh_kinematics::Parameters;
use rs_dh_kinematics::utils::dump_joints;

/// Forward kinematics, reachability and inverse kinematics on a 3-DOF arm.
fn main() {
    let robot = DHKinematics::new(Parameters::planar_3dof()).expect("Valid chain");
    let mut chain = KinematicChain::new(robot);

    // Jog the shoulder like the plus button on the panel would.
    chain.jog(1, 0.2).expect("Joint 1 is variable");
    for i in 0..chain.dof() {
        println!("Joint {} at {:?}", i, chain.joint_position(i, FrameKind::Actual));
    }

    let target = Vector3::new(1.0, 0.5, 0.5);
    let reachability = chain.check_reachability(&target);
    println!("Target {:?} likely reachable: {} (distance {:.3}, reach {:.3})",
             target, reachability.likely_reachable, reachability.distance_from_base, reachability.max_reach);

    let solution = chain.solve(&target, &DlsParameters::default()).expect("Valid input");
    println!("Converged: {} in {} iterations, final error {:.6} m",
             solution.converged, solution.diagnostics.iterations, solution.diagnostics.final_error);
    println!("Error history: {:?}", solution.diagnostics.error_history);

    // Nothing changes until the solution is applied.
    chain.apply(&solution).expect("Same number of joints");
    dump_joints(chain.joints());
    println!("End effector now at {:?}", chain.end_effector().translation.vector);

    // Far outside: the solver still returns its best effort.
    let far = Vector3::new(10.0, 10.0, 10.0);
    println!("Far target likely reachable: {}", chain.check_reachability(&far).likely_reachable);
    let solution = chain.solve(&far, &DlsParameters::default()).expect("Valid input");
    println!("Converged: {}, termination {:?}, final error {:.3} m",
             solution.converged, solution.diagnostics.termination, solution.diagnostics.final_error);
}
