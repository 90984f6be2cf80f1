use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::chain::KinematicChain;
use crate::ik_solver::{AbortReason, DlsParameters, DlsSolver, Termination};
use crate::joint_command::JointCommand;
use crate::kinematic_traits::Kinematics;
use crate::kinematics_impl::DHKinematics;
use crate::parameters::dh_kinematics::Parameters;
use crate::tests::test_utils::{load_chain, random_joints};

fn tcp(robot: &impl Kinematics, joints: &[f64]) -> Vector3<f64> {
    robot.forward(joints).unwrap().translation.vector
}

#[test]
fn test_planar_reachable_target() {
    let (robot, parameters) = load_chain("planar_3dof.yaml").unwrap();
    let mut chain = KinematicChain::new(robot);
    let target = Vector3::new(1.0, 0.5, 0.5);

    assert!(chain.check_reachability(&target).likely_reachable);
    let solution = chain.solve(&target, &parameters).unwrap();
    assert!(solution.converged);
    assert!(solution.diagnostics.final_error < 0.001);
    assert!(solution.diagnostics.iterations <= 200);

    chain.apply(&solution).unwrap();
    assert!((chain.end_effector().translation.vector - target).norm() < 0.001);

    // Second call starts where the first stopped.
    let again = chain.solve(&target, &parameters).unwrap();
    assert!(again.converged);
    assert!(again.diagnostics.iterations <= 1);
}

#[test]
fn test_targets_produced_by_forward_kinematics() {
    // Every target is reachable by construction. The seed is a perturbation of the
    // generating angles, so the solver stays within one branch.
    // Joint 2 is kept bent away from the stretched out (singular) arm where convergence is slow.
    let mut rng = StdRng::seed_from_u64(42);
    let solver = DlsSolver::new(DlsParameters { max_iterations: 1000, ..DlsParameters::default() });
    for parameters in [Parameters::planar_3dof(), Parameters::offset_3dof(), Parameters::industrial_6dof()] {
        let robot = DHKinematics::new(parameters).unwrap();
        for _ in 0..20 {
            let mut joints = random_joints(&mut rng, robot.dof(), 1.2);
            if joints[2].abs() < 0.3 {
                joints[2] = 0.3_f64.copysign(joints[2]);
            }
            let target = tcp(&robot, &joints);
            let seed: Vec<f64> = joints.iter().map(|j| j + rng.gen_range(-0.15..=0.15)).collect();

            let solution = solver.solve_from(&robot, &target, &seed).unwrap();
            assert!(solution.converged, "Target {:?} from seed {:?}: {:?}",
                    target, seed, solution.diagnostics);
            assert!((tcp(&robot, &solution.joints) - target).norm() < 0.001);
        }
    }
}

#[test]
fn test_offset_chain_from_yaml() {
    let (robot, parameters) = load_chain("offset_3dof.yaml").unwrap();
    let target = tcp(&robot, &[0.4, 0.5, -0.3]);
    let solution = DlsSolver::new(parameters).solve_from(&robot, &target, &[0.3, 0.6, -0.2]).unwrap();
    assert!(solution.converged);
    assert!(solution.diagnostics.final_error < parameters.tolerance);
}

#[test]
fn test_fixed_joint_is_not_moved() {
    let (robot, parameters) = load_chain("fixed_wrist.yaml").unwrap();
    let target = tcp(&robot, &[0.5, 0.0, -0.4]);
    let seed = [0.3, 1.0, -0.2];
    let solution = DlsSolver::new(parameters).solve_from(&robot, &target, &seed).unwrap();
    assert!(solution.converged);
    // Column of the fixed joint is zero, so its slot stays at the seed value.
    assert_eq!(solution.joints[1], 1.0);
}

#[test]
fn test_unreachable_target() {
    let mut chain = KinematicChain::new(DHKinematics::new(Parameters::planar_3dof()).unwrap());
    let target = Vector3::new(10.0, 10.0, 10.0);
    assert!(!chain.check_reachability(&target).likely_reachable);

    let parameters = DlsParameters::default();
    let solution = chain.solve(&target, &parameters).unwrap();
    assert!(!solution.converged);
    assert_eq!(solution.diagnostics.error_history.len(), parameters.max_iterations);
    assert_eq!(solution.diagnostics.final_error, *solution.diagnostics.error_history.last().unwrap());

    // Best effort angles are still applicable.
    chain.apply(&solution).unwrap();
    assert_eq!(chain.joints(), solution.joints.as_slice());
    assert!((chain.end_effector().translation.vector - target).norm() > 9.5);
}

#[test]
fn test_cancel_from_another_thread() {
    let robot = DHKinematics::new(Parameters::planar_3dof()).unwrap();
    let stop = AtomicBool::new(false);
    let solver = DlsSolver::new(DlsParameters { max_iterations: usize::MAX, ..DlsParameters::default() });
    let target = Vector3::new(10.0, 10.0, 10.0);

    let solution = thread::scope(|scope| {
        let worker = scope.spawn(|| solver.solve_cancellable(&robot, &target, &[0.0; 3], &stop));
        thread::sleep(std::time::Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
        worker.join().unwrap()
    }).unwrap();

    assert!(!solution.converged);
    match solution.diagnostics.termination {
        Termination::Aborted(AbortReason::Cancelled { iteration }) => {
            assert_eq!(iteration, solution.diagnostics.iterations);
            assert_eq!(iteration, solution.diagnostics.error_history.len());
        }
        other => panic!("Expected cancellation, got {:?}", other),
    }
}

#[test]
fn test_solution_to_device_and_back() {
    let mut chain = KinematicChain::new(DHKinematics::new(Parameters::planar_3dof()).unwrap());
    let target = Vector3::new(0.9, -0.7, 0.5);
    let solution = chain.solve(&target, &DlsParameters::default()).unwrap();
    assert!(solution.converged);

    let line = JointCommand::degrees_from_radians(&solution.joints).encode();
    assert!(line.starts_with("D,") && line.ends_with('\n'));

    // The device echoes the angles back as feedback.
    let feedback: JointCommand = line.parse().unwrap();
    chain.set_joints(&feedback.to_radians()).unwrap();
    // Two decimals in degrees leave at most a few millimeters of error.
    assert!((chain.end_effector().translation.vector - target).norm() < 0.005);

    let line = JointCommand::radians(&solution.joints).encode();
    let feedback: JointCommand = line.parse().unwrap();
    chain.set_joints(&feedback.to_radians()).unwrap();
    assert!((chain.end_effector().translation.vector - target).norm() < 0.0011);
}
