//! Damped Newton–Raphson iteration for equation problems.
//!
//! Each iteration forms a forward-difference Jacobian, solves the Newton
//! system with dense partial-pivot elimination, then backtracks along the
//! Newton direction until the residual norm decreases. The method is fast
//! near a root but makes no attempt to rescue a singular Jacobian or a
//! stalled line search — both are reported as typed errors so an outer
//! policy (see [`fallback`](crate::equation::fallback)) can move on to a
//! more forgiving method.

use tandem_core::{EquationProblem, Model, Observer};

use crate::equation::{Error, Evaluation, Solution, Status, evaluate, jacobian, linear};

/// Control actions supported by the Newton solver.
pub enum Action {
    /// Stop the solver early, reporting the latest accepted state.
    StopEarly,
}

/// Iteration event emitted by the Newton solver.
pub struct Event<'a, I, O, const N: usize> {
    /// Iteration counter (1-based).
    pub iter: usize,
    /// Evaluation at the newly accepted state.
    pub eval: &'a Evaluation<I, O, N>,
    /// Fraction of the full Newton step that was accepted.
    pub step_scale: f64,
}

/// Configuration for the Newton solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub max_iters: usize,
    /// Convergence threshold on the largest absolute residual.
    pub residual_tol: f64,
    /// Relative forward-difference step for the Jacobian.
    pub fd_step: f64,
    /// How many times the step may be halved before the line search is
    /// declared stalled.
    pub max_backtracks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            residual_tol: 1e-6,
            fd_step: 1e-8,
            max_backtracks: 8,
        }
    }
}

impl Config {
    /// Validates that the configuration describes a runnable solve.
    ///
    /// # Errors
    ///
    /// Returns a reason string if any tolerance or step is unusable.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.residual_tol.is_finite() || self.residual_tol < 0.0 {
            return Err("residual_tol must be finite and non-negative");
        }
        if !self.fd_step.is_finite() || self.fd_step <= 0.0 {
            return Err("fd_step must be finite and positive");
        }
        Ok(())
    }
}

/// Finds a root of the equation system using damped Newton iteration.
/// Observers see each accepted iterate and may stop the solve early.
///
/// # Errors
///
/// Returns an error if the config is invalid, an evaluation fails, the
/// Jacobian is singular or non-finite, or the line search cannot find a
/// descent step.
pub fn solve<M, P, Obs, const N: usize>(
    model: &M,
    problem: &P,
    initial_guess: [f64; N],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output, N>, Error>
where
    M: Model,
    P: EquationProblem<N, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output, N>, Action>,
{
    config
        .validate()
        .map_err(|reason| Error::InvalidConfig { reason })?;

    let mut current = evaluate(model, problem, initial_guess)?;
    let mut current_norm = current.residual_norm();
    if !current_norm.is_finite() {
        return Err(Error::NonFiniteResidual { iter: 0 });
    }
    if current_norm <= config.residual_tol {
        return Ok(Solution::from_eval(current, Status::Converged, 0));
    }

    for iter in 1..=config.max_iters {
        let j = jacobian::forward_difference(
            model,
            problem,
            &current.x,
            &current.residuals,
            config.fd_step,
            iter,
        )?;

        let mut rhs = [0.0; N];
        for (r, res) in rhs.iter_mut().zip(current.residuals.iter()) {
            *r = -res;
        }
        let dx = linear::solve(j, rhs).ok_or(Error::SingularJacobian { iter })?;

        // Backtracking line search along the Newton direction.
        let mut step_scale = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_backtracks {
            let mut x_trial = current.x;
            for (xt, d) in x_trial.iter_mut().zip(dx.iter()) {
                *xt += step_scale * d;
            }

            let trial = evaluate(model, problem, x_trial)?;
            let trial_norm = trial.residual_norm();
            if trial_norm.is_finite() && trial_norm < current_norm {
                accepted = Some((trial, trial_norm));
                break;
            }
            step_scale *= 0.5;
        }

        let Some((next, next_norm)) = accepted else {
            return Err(Error::LineSearchStalled {
                iter,
                residual_norm: current_norm,
            });
        };
        current = next;
        current_norm = next_norm;

        let event = Event {
            iter,
            eval: &current,
            step_scale,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::from_eval(
                current,
                Status::StoppedByObserver,
                iter,
            ));
        }

        if current_norm <= config.residual_tol {
            return Ok(Solution::from_eval(current, Status::Converged, iter));
        }
    }

    let iters = config.max_iters;
    Ok(Solution::from_eval(current, Status::MaxIters, iters))
}

/// Runs Newton iteration without observation.
///
/// # Errors
///
/// Same failure modes as [`solve`].
pub fn solve_unobserved<M, P, const N: usize>(
    model: &M,
    problem: &P,
    initial_guess: [f64; N],
    config: &Config,
) -> Result<Solution<M::Input, M::Output, N>, Error>
where
    M: Model,
    P: EquationProblem<N, Input = M::Input, Output = M::Output>,
{
    solve(model, problem, initial_guess, config, ())
}
