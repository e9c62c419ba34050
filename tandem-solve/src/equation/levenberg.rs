//! Levenberg–Marquardt damped least squares for equation problems.
//!
//! Instead of solving the raw Newton system, each step solves the damped
//! normal equations `(JᵀJ + λ·diag(JᵀJ))·dx = −Jᵀr`, interpolating between
//! Gauss–Newton (small λ) and scaled gradient descent (large λ). Steps
//! that do not reduce the least-squares cost are rejected and retried with
//! a larger λ.
//!
//! Two properties make this the workhorse for stubborn systems:
//!
//! - a rank-deficient Jacobian only flattens some directions of the damped
//!   system, it does not break the solve; and
//! - on a system with no exact root the iteration settles at the
//!   least-squares compromise and reports convergence through the cost
//!   stagnation (`ftol`) or step size (`xtol`) criteria, with the residual
//!   norm left visible in the solution.

use tandem_core::{EquationProblem, Model, Observer};

use crate::equation::{Error, Evaluation, Solution, Status, evaluate, jacobian, linear};

/// Relative floor applied to zero diagonal entries of `JᵀJ` so damping
/// still regularizes directions the Jacobian is blind to.
const DIAG_FLOOR: f64 = 1e-9;

/// Control actions supported by the Levenberg–Marquardt solver.
pub enum Action {
    /// Stop the solver early, reporting the latest accepted state.
    StopEarly,
}

/// Iteration event emitted by the Levenberg–Marquardt solver.
pub struct Event<'a, I, O, const N: usize> {
    /// Iteration counter (1-based, counts accepted steps).
    pub iter: usize,
    /// Evaluation at the newly accepted state.
    pub eval: &'a Evaluation<I, O, N>,
    /// Damping factor after the step was accepted.
    pub lambda: f64,
}

/// Configuration for the Levenberg–Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub max_iters: usize,
    /// Convergence threshold on the largest absolute residual.
    pub residual_tol: f64,
    /// Converged when an accepted step reduces the cost by less than this
    /// fraction of its previous value.
    pub ftol: f64,
    /// Converged when the proposed step is this small relative to `x`.
    pub xtol: f64,
    /// Relative forward-difference step for the Jacobian.
    pub fd_step: f64,
    /// Initial damping factor.
    pub lambda_init: f64,
    /// Factor applied to the damping on rejection (and divided out on
    /// acceptance).
    pub lambda_scale: f64,
    /// Rejections push the damping no further than this.
    pub lambda_max: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 200,
            residual_tol: 1e-8,
            ftol: 1e-10,
            xtol: 1e-12,
            fd_step: 1e-8,
            lambda_init: 1e-3,
            lambda_scale: 10.0,
            lambda_max: 1e10,
        }
    }
}

impl Config {
    /// Validates that the configuration describes a runnable solve.
    ///
    /// # Errors
    ///
    /// Returns a reason string if any tolerance, step, or damping bound is
    /// unusable.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.residual_tol.is_finite() || self.residual_tol < 0.0 {
            return Err("residual_tol must be finite and non-negative");
        }
        if !self.ftol.is_finite() || self.ftol < 0.0 {
            return Err("ftol must be finite and non-negative");
        }
        if !self.xtol.is_finite() || self.xtol < 0.0 {
            return Err("xtol must be finite and non-negative");
        }
        if !self.fd_step.is_finite() || self.fd_step <= 0.0 {
            return Err("fd_step must be finite and positive");
        }
        if !self.lambda_init.is_finite() || self.lambda_init <= 0.0 {
            return Err("lambda_init must be finite and positive");
        }
        if !self.lambda_scale.is_finite() || self.lambda_scale <= 1.0 {
            return Err("lambda_scale must be finite and greater than one");
        }
        if !self.lambda_max.is_finite() || self.lambda_max < self.lambda_init {
            return Err("lambda_max must be finite and at least lambda_init");
        }
        Ok(())
    }
}

/// Finds a root (or the least-squares compromise) of the equation system.
/// Observers see each accepted iterate and may stop the solve early.
///
/// # Errors
///
/// Returns an error if the config is invalid, an evaluation fails, the
/// Jacobian is non-finite, or every damping level up to `lambda_max` is
/// rejected.
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
    if !current.residual_norm().is_finite() {
        return Err(Error::NonFiniteResidual { iter: 0 });
    }
    if current.residual_norm() <= config.residual_tol {
        return Ok(Solution::from_eval(current, Status::Converged, 0));
    }

    let mut cost = current.cost();
    let mut lambda = config.lambda_init;

    for iter in 1..=config.max_iters {
        let j = jacobian::forward_difference(
            model,
            problem,
            &current.x,
            &current.residuals,
            config.fd_step,
            iter,
        )?;

        // Normal equations: a = JᵀJ, g = Jᵀr.
        let mut a = [[0.0; N]; N];
        let mut g = [0.0; N];
        for row in 0..N {
            for col in 0..N {
                let mut sum = 0.0;
                for k in 0..N {
                    sum += j[k][row] * j[k][col];
                }
                a[row][col] = sum;
            }
            let mut sum = 0.0;
            for k in 0..N {
                sum += j[k][row] * current.residuals[k];
            }
            g[row] = sum;
        }
        let diag_scale = (0..N).fold(0.0_f64, |acc, i| acc.max(a[i][i]));

        // Damping search: raise lambda until a step is accepted.
        let accepted = loop {
            let mut damped = a;
            for (i, row) in damped.iter_mut().enumerate() {
                row[i] += lambda * a[i][i].max(diag_scale * DIAG_FLOOR);
            }
            let mut rhs = [0.0; N];
            for (r, gi) in rhs.iter_mut().zip(g.iter()) {
                *r = -gi;
            }

            if let Some(dx) = linear::solve(damped, rhs) {
                let step_norm = dx.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
                let x_norm = current.x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
                if step_norm <= config.xtol * (1.0 + x_norm) {
                    return Ok(Solution::from_eval(current, Status::Converged, iter));
                }

                let mut x_trial = current.x;
                for (xt, d) in x_trial.iter_mut().zip(dx.iter()) {
                    *xt += d;
                }
                let trial = evaluate(model, problem, x_trial)?;
                let trial_cost = trial.cost();
                if trial_cost.is_finite() && trial_cost <= cost {
                    break (trial, trial_cost);
                }
            }

            lambda *= config.lambda_scale;
            if lambda > config.lambda_max {
                return Err(Error::DampingExhausted { iter, lambda });
            }
        };

        let (next, next_cost) = accepted;
        let cost_drop = cost - next_cost;
        let prev_cost = cost;
        current = next;
        cost = next_cost;
        lambda = (lambda / config.lambda_scale).max(1e-12);

        let event = Event {
            iter,
            eval: &current,
            lambda,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution::from_eval(
                current,
                Status::StoppedByObserver,
                iter,
            ));
        }

        if current.residual_norm() <= config.residual_tol {
            return Ok(Solution::from_eval(current, Status::Converged, iter));
        }
        if cost_drop <= config.ftol * prev_cost {
            return Ok(Solution::from_eval(current, Status::Converged, iter));
        }
    }

    let iters = config.max_iters;
    Ok(Solution::from_eval(current, Status::MaxIters, iters))
}

/// Runs Levenberg–Marquardt without observation.
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
