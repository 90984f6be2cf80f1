//! Damped least squares (Levenberg-Marquardt style) inverse kinematics for the position of
//! the end effector.
//!
//! Each iteration evaluates forward kinematics, builds the numerical 3xN Jacobian and
//! solves `(J·Jᵗ + λI) δx = e`, moving the joints by `step_size · Jᵗ δx`. The damping λ
//! keeps the system solvable when J is rank deficient, at the cost of exactness.
//!
//! The solver is a pure function of its inputs: it starts from a seed (normally the live
//! pose of the chain) and returns proposed joint angles with diagnostics. It never
//! writes back to any chain.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use crate::jacobian::{Jacobian, DEFAULT_EPSILON};
use crate::kinematic_traits::{Joints, Kinematics, Position};
use crate::kinematics_error::{check_dimension, KinematicsError};
use crate::utils::is_valid;

/// Tuning of the solver. The defaults are empirically chosen, not derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DlsParameters {
    /// Upper bound on the number of iterations.
    pub max_iterations: usize,

    /// Euclidean distance to the target, meters, below which the solve counts as converged.
    pub tolerance: f64,

    /// Regularization λ added to the diagonal of J·Jᵗ.
    pub damping: f64,

    /// Under-relaxation of the joint update, in (0, 1]. Smaller is more stable but slower.
    pub step_size: f64,

    /// Joint disturbance for the numerical Jacobian, radians.
    pub epsilon: f64,
}

impl Default for DlsParameters {
    fn default() -> Self {
        DlsParameters {
            max_iterations: 200,
            tolerance: 0.001,
            damping: 0.1,
            step_size: 0.5,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl DlsParameters {
    pub fn validate(&self) -> Result<(), KinematicsError> {
        let invalid = |msg: String| Err(KinematicsError::InvalidParameter(msg));
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return invalid(format!("tolerance must be positive, got {}", self.tolerance));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return invalid(format!("damping must be non-negative, got {}", self.damping));
        }
        if !(self.step_size > 0.0 && self.step_size <= 1.0) {
            return invalid(format!("step size must be in (0, 1], got {}", self.step_size));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return invalid(format!("epsilon must be positive, got {}", self.epsilon));
        }
        Ok(())
    }
}

/// Why the iteration stopped before convergence or exhausting the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The damped normal matrix could not be solved at working precision.
    SingularConfiguration { iteration: usize },
    /// The stop flag was raised.
    Cancelled { iteration: usize },
}

/// Terminal state of the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    /// Iteration budget used up without reaching the tolerance.
    Exhausted,
    Aborted(AbortReason),
}

/// Convergence information, exposed verbatim for plotting or logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// Index of the converging or aborting iteration, or the budget if exhausted.
    pub iterations: usize,

    /// Last computed distance to the target, meters.
    pub final_error: f64,

    /// Distance to the target at the start of every iteration.
    pub error_history: Vec<f64>,

    pub termination: Termination,
}

/// Proposed joint angles. Not converged solutions are the best effort and are still returned.
#[derive(Debug, Clone, PartialEq)]
pub struct IkSolution {
    pub converged: bool,
    pub joints: Joints,
    pub diagnostics: Diagnostics,
}

/// Working state carried between iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct IkState {
    pub joints: Joints,
    pub error_history: Vec<f64>,
}

impl IkState {
    pub fn new(seed: &[f64]) -> Self {
        IkState { joints: seed.to_vec(), error_history: Vec::new() }
    }

    /// Iterations performed so far.
    pub fn iteration(&self) -> usize {
        self.error_history.len()
    }
}

/// Outcome of a single iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Joints were updated, iterate again.
    Advance(IkState),
    /// Converged or aborted; the state holds the final joints.
    Stop(IkState, Termination),
}

#[derive(Debug, Clone, Copy)]
pub struct DlsSolver {
    parameters: DlsParameters,
}

impl DlsSolver {
    pub const fn new(parameters: DlsParameters) -> Self {
        DlsSolver { parameters }
    }

    pub fn with_defaults() -> Self {
        Self::new(DlsParameters::default())
    }

    pub fn parameters(&self) -> &DlsParameters {
        &self.parameters
    }

    /// One iteration: measure the error, stop if within tolerance, otherwise take a damped
    /// least squares step. The state passed in is consumed and the next one returned.
    pub fn step(&self, robot: &impl Kinematics, target: &Position, mut state: IkState)
                -> Result<Step, KinematicsError> {
        let iteration = state.iteration();
        let current = robot.forward(&state.joints)?.translation.vector;
        let error = target - current;
        let error_norm = error.norm();
        state.error_history.push(error_norm);

        if iteration % 10 == 0 {
            debug!("Iteration {:3}: error = {:.6} m, joints (deg) = {:?}", iteration, error_norm,
                state.joints.iter().map(|j| (j.to_degrees() * 10.0).round() / 10.0).collect::<Vec<_>>());
        }

        if error_norm < self.parameters.tolerance {
            return Ok(Step::Stop(state, Termination::Converged));
        }

        let jacobian = Jacobian::new(robot, &state.joints, self.parameters.epsilon)?;
        match jacobian.damped_least_squares(&error, self.parameters.damping) {
            Some(delta) => {
                for (joint, d) in state.joints.iter_mut().zip(delta.iter()) {
                    *joint += self.parameters.step_size * d;
                }
                Ok(Step::Advance(state))
            }
            None => {
                warn!("Singular configuration at iteration {}, error = {:.6} m", iteration, error_norm);
                Ok(Step::Stop(state, Termination::Aborted(AbortReason::SingularConfiguration { iteration })))
            }
        }
    }

    /// Solves for the target starting from `seed`, up to `max_iterations` steps.
    pub fn solve_from(&self, robot: &impl Kinematics, target: &Position, seed: &[f64])
                      -> Result<IkSolution, KinematicsError> {
        self.drive(robot, target, seed, None)
    }

    /// As [DlsSolver::solve_from], but checks `stop` at the top of every iteration and aborts
    /// with `Cancelled` once it is set.
    pub fn solve_cancellable(&self, robot: &impl Kinematics, target: &Position, seed: &[f64],
                             stop: &AtomicBool) -> Result<IkSolution, KinematicsError> {
        self.drive(robot, target, seed, Some(stop))
    }

    fn drive(&self, robot: &impl Kinematics, target: &Position, seed: &[f64],
             stop: Option<&AtomicBool>) -> Result<IkSolution, KinematicsError> {
        self.parameters.validate()?;
        check_dimension("seed joint angles", robot.dof(), seed.len())?;
        if !is_valid(target.as_slice()) {
            return Err(KinematicsError::InvalidParameter(format!("target {:?} is not finite", target)));
        }
        if !is_valid(seed) {
            return Err(KinematicsError::InvalidParameter(format!("seed {:?} is not finite", seed)));
        }

        let mut state = IkState::new(seed);
        for iteration in 0..self.parameters.max_iterations {
            if stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
                debug!("Solve cancelled at iteration {}", iteration);
                let termination = Termination::Aborted(AbortReason::Cancelled { iteration });
                return self.finish(robot, target, state, termination, iteration);
            }
            match self.step(robot, target, state)? {
                Step::Advance(next) => state = next,
                Step::Stop(last, termination) => {
                    return self.finish(robot, target, last, termination, iteration);
                }
            }
        }

        let iterations = self.parameters.max_iterations;
        self.finish(robot, target, state, Termination::Exhausted, iterations)
    }

    fn finish(&self, robot: &impl Kinematics, target: &Position, state: IkState,
              termination: Termination, iterations: usize) -> Result<IkSolution, KinematicsError> {
        let final_error = match state.error_history.last() {
            Some(&error) => error,
            // Nothing was measured yet, report the error of the returned joints.
            None => (target - robot.forward(&state.joints)?.translation.vector).norm(),
        };
        let converged = termination == Termination::Converged;

        match termination {
            Termination::Converged =>
                debug!("Converged in {} iterations, final error {:.6} m", iterations, final_error),
            Termination::Exhausted =>
                debug!("Did not converge in {} iterations, final error {:.6} m", iterations, final_error),
            Termination::Aborted(reason) =>
                debug!("Aborted ({:?}), final error {:.6} m", reason, final_error),
        }

        Ok(IkSolution {
            converged,
            joints: state.joints,
            diagnostics: Diagnostics {
                iterations,
                final_error,
                error_history: state.error_history,
                termination,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics_impl::DHKinematics;
    use crate::parameters::dh_kinematics::{DhRow, Parameters};
    use nalgebra::Vector3;

    fn planar() -> DHKinematics {
        DHKinematics::new(Parameters::planar_3dof()).unwrap()
    }

    #[test]
    fn test_converges_on_reachable_target() {
        let robot = planar();
        let target = Vector3::new(1.0, 0.5, 0.5);
        let solution = DlsSolver::with_defaults().solve_from(&robot, &target, &[0.0; 3]).unwrap();

        assert!(solution.converged, "Diagnostics: {:?}", solution.diagnostics);
        assert_eq!(solution.diagnostics.termination, Termination::Converged);
        assert!(solution.diagnostics.final_error < 0.001);
        assert!(solution.diagnostics.iterations < 200);
        assert_eq!(solution.diagnostics.error_history.len(), solution.diagnostics.iterations + 1);

        let reached = robot.forward(&solution.joints).unwrap().translation.vector;
        assert!((reached - target).norm() < 0.001);
    }

    #[test]
    fn test_unreachable_target_exhausts_budget() {
        let robot = planar();
        let target = Vector3::new(10.0, 10.0, 10.0);
        let solution = DlsSolver::with_defaults().solve_from(&robot, &target, &[0.0; 3]).unwrap();

        assert!(!solution.converged);
        let diagnostics = &solution.diagnostics;
        assert_eq!(diagnostics.termination, Termination::Exhausted);
        assert_eq!(diagnostics.iterations, 200);
        assert_eq!(diagnostics.error_history.len(), 200);
        assert_eq!(Some(&diagnostics.final_error), diagnostics.error_history.last());
        // The arm cannot leave z = 0.5, so the target stays at least 9.5 m away.
        assert!(diagnostics.final_error > 9.5);
    }

    #[test]
    fn test_second_solve_converges_immediately() {
        let robot = planar();
        let solver = DlsSolver::with_defaults();
        let target = Vector3::new(1.0, 0.5, 0.5);
        let first = solver.solve_from(&robot, &target, &[0.0; 3]).unwrap();
        assert!(first.converged);

        let second = solver.solve_from(&robot, &target, &first.joints).unwrap();
        assert!(second.converged);
        assert!(second.diagnostics.iterations <= 1);
        assert_eq!(second.joints, first.joints);
    }

    #[test]
    fn test_singular_configuration_aborts() {
        // A joint without any link cannot move the end effector; without damping
        // the normal matrix is zero.
        let robot = DHKinematics::new(Parameters::with_identity_offsets(vec![
            DhRow::variable(0.0, 0.0, 0.0),
        ])).unwrap();
        let solver = DlsSolver::new(DlsParameters { damping: 0.0, ..DlsParameters::default() });
        let solution = solver.solve_from(&robot, &Vector3::new(1.0, 0.0, 0.0), &[0.3]).unwrap();

        assert!(!solution.converged);
        assert_eq!(
            solution.diagnostics.termination,
            Termination::Aborted(AbortReason::SingularConfiguration { iteration: 0 })
        );
        assert_eq!(solution.diagnostics.iterations, 0);
        assert_eq!(solution.diagnostics.error_history, vec![1.0]);
        assert_eq!(solution.joints, vec![0.3]);
    }

    #[test]
    fn test_cancelled_before_first_iteration() {
        let robot = planar();
        let stop = AtomicBool::new(true);
        let target = Vector3::new(1.0, 0.5, 0.5);
        let solution = DlsSolver::with_defaults()
            .solve_cancellable(&robot, &target, &[0.0; 3], &stop).unwrap();

        assert!(!solution.converged);
        assert_eq!(
            solution.diagnostics.termination,
            Termination::Aborted(AbortReason::Cancelled { iteration: 0 })
        );
        assert!(solution.diagnostics.error_history.is_empty());
        // Seed tip is at (1.8, 0, 0.5).
        let expected = (Vector3::new(1.8, 0.0, 0.5) - target).norm();
        assert!((solution.diagnostics.final_error - expected).abs() < 1e-9);
    }

    #[test]
    fn test_step_by_step() {
        let robot = planar();
        let solver = DlsSolver::with_defaults();
        let target = Vector3::new(1.0, 0.5, 0.5);

        let mut state = IkState::new(&[0.0, 0.3, -0.6]);
        let mut converged = false;
        for _ in 0..200 {
            match solver.step(&robot, &target, state).unwrap() {
                Step::Advance(next) => state = next,
                Step::Stop(last, termination) => {
                    assert_eq!(termination, Termination::Converged);
                    assert!(*last.error_history.last().unwrap() < 0.001);
                    converged = true;
                    break;
                }
            }
        }
        assert!(converged);
    }

    #[test]
    fn test_rejects_bad_input() {
        let robot = planar();
        let target = Vector3::new(1.0, 0.5, 0.5);
        assert_eq!(
            DlsSolver::with_defaults().solve_from(&robot, &target, &[0.0; 2]).unwrap_err(),
            KinematicsError::DimensionMismatch { what: "seed joint angles", expected: 3, found: 2 }
        );
        for parameters in [
            DlsParameters { step_size: 0.0, ..DlsParameters::default() },
            DlsParameters { step_size: 1.5, ..DlsParameters::default() },
            DlsParameters { damping: -0.1, ..DlsParameters::default() },
            DlsParameters { tolerance: 0.0, ..DlsParameters::default() },
            DlsParameters { epsilon: f64::NAN, ..DlsParameters::default() },
        ] {
            assert!(matches!(
                DlsSolver::new(parameters).solve_from(&robot, &target, &[0.0; 3]),
                Err(KinematicsError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_target_and_seed() {
        let robot = planar();
        let solver = DlsSolver::with_defaults();
        for target in [Vector3::new(f64::NAN, 0.0, 0.0), Vector3::new(1.0, f64::INFINITY, 0.5)] {
            assert!(matches!(
                solver.solve_from(&robot, &target, &[0.0; 3]),
                Err(KinematicsError::InvalidParameter(_))
            ));
        }
        let target = Vector3::new(1.0, 0.5, 0.5);
        assert!(matches!(
            solver.solve_from(&robot, &target, &[0.0, f64::NAN, 0.0]),
            Err(KinematicsError::InvalidParameter(_))
        ));
        let stop = AtomicBool::new(false);
        assert!(matches!(
            solver.solve_cancellable(&robot, &Vector3::new(f64::NAN, 0.0, 0.0), &[0.0; 3], &stop),
            Err(KinematicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_budget_reports_seed_error() {
        let robot = planar();
        let solver = DlsSolver::new(DlsParameters { max_iterations: 0, ..DlsParameters::default() });
        let target = Vector3::new(1.8, 0.0, 1.5);
        let solution = solver.solve_from(&robot, &target, &[0.0; 3]).unwrap();
        assert!(!solution.converged);
        assert_eq!(solution.diagnostics.termination, Termination::Exhausted);
        assert_eq!(solution.diagnostics.iterations, 0);
        assert!((solution.diagnostics.final_error - 1.0).abs() < 1e-9);
    }
}
