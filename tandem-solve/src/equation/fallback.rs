//! Ordered-fallback driver for equation solves.
//!
//! Root-finding on a physical system rarely hinges on one perfectly tuned
//! method: a configuration that is fast on well-behaved inputs can fail
//! outright on an ill-conditioned one. A [`Plan`] makes the retry policy
//! explicit — an ordered list of named (method, configuration) entries —
//! and [`solve`] walks it in sequence, accepting the first entry that
//! reports convergence.
//!
//! Every attempt is recorded in a [`Trace`]: strategies that finish
//! without converging, and strategies that fail with an internal numerical
//! error, both leave a record behind. On success the trace rides along
//! with the solution; on exhaustion it is carried by the error, so the
//! caller decides how to surface the diagnostics.

use std::fmt;

use thiserror::Error as ThisError;

use tandem_core::{EquationProblem, Model};

use crate::equation::{Solution, Status, levenberg, newton};

/// A root-finding method together with its full configuration.
///
/// There are no hidden defaults: everything a method will do is visible in
/// the plan entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Newton(newton::Config),
    Levenberg(levenberg::Config),
}

/// A named entry in a [`Plan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strategy {
    /// Short identifier used in traces and diagnostics.
    pub name: &'static str,
    pub method: Method,
}

/// An ordered list of strategies to attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub strategies: Vec<Strategy>,
}

impl Default for Plan {
    /// The default ladder: exact Newton first, then progressively more
    /// forgiving configurations.
    ///
    /// Newton handles well-posed inputs in a handful of iterations. The
    /// Levenberg–Marquardt entries carry the cases Newton cannot: systems
    /// whose Jacobian is rank-deficient and systems with no exact root,
    /// where a least-squares compromise is the best available answer. The
    /// final heavily damped Newton entry mops up the occasional system
    /// where a cautious line search succeeds after damping did not.
    fn default() -> Self {
        Self {
            strategies: vec![
                Strategy {
                    name: "newton",
                    method: Method::Newton(newton::Config::default()),
                },
                Strategy {
                    name: "newton-relaxed",
                    method: Method::Newton(newton::Config {
                        residual_tol: 1e-5,
                        ..newton::Config::default()
                    }),
                },
                Strategy {
                    name: "levenberg",
                    method: Method::Levenberg(levenberg::Config {
                        residual_tol: 1e-5,
                        ..levenberg::Config::default()
                    }),
                },
                Strategy {
                    name: "levenberg-coarse",
                    method: Method::Levenberg(levenberg::Config {
                        residual_tol: 1e-3,
                        ftol: 1e-8,
                        ..levenberg::Config::default()
                    }),
                },
                Strategy {
                    name: "newton-damped",
                    method: Method::Newton(newton::Config {
                        residual_tol: 1e-3,
                        max_iters: 300,
                        max_backtracks: 24,
                        ..newton::Config::default()
                    }),
                },
            ],
        }
    }
}

/// How a single strategy ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// The strategy finished its iteration budget without converging.
    DidNotConverge { iters: usize, residual_norm: f64 },
    /// The strategy failed with an internal numerical error.
    Failed { message: String },
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DidNotConverge {
                iters,
                residual_norm,
            } => write!(
                f,
                "did not converge after {iters} iterations (residual norm {residual_norm:.3e})"
            ),
            Self::Failed { message } => write!(f, "{message}"),
        }
    }
}

/// The record of one strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub strategy: &'static str,
    pub outcome: AttemptOutcome,
}

/// Everything that happened before the solve succeeded or gave up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub attempts: Vec<AttemptRecord>,
}

impl Trace {
    /// Diagnostic message of the most recent attempt, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<String> {
        self.attempts
            .last()
            .map(|attempt| format!("{}: {}", attempt.strategy, attempt.outcome))
    }
}

/// A converged solve together with the strategy that produced it and the
/// record of everything tried before it.
#[derive(Debug, Clone)]
pub struct Solved<I, O, const N: usize> {
    /// Name of the strategy that converged.
    pub strategy: &'static str,
    pub solution: Solution<I, O, N>,
    pub trace: Trace,
}

/// Errors from driving a plan.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("the plan contains no strategies")]
    EmptyPlan,

    #[error(
        "all {} strategies failed to converge; last diagnostic: {}",
        .trace.attempts.len(),
        .trace.last_message().unwrap_or_default()
    )]
    Exhausted { trace: Trace },
}

/// Drives the plan's strategies in order, returning the first convergence.
///
/// Later strategies start again from `initial_guess`, not from the failed
/// iterates of earlier ones, so a diverging attempt cannot poison the rest
/// of the plan.
///
/// # Errors
///
/// Returns [`Error::EmptyPlan`] for a plan with no entries, and
/// [`Error::Exhausted`] — carrying the full [`Trace`] — when every
/// strategy has been attempted without convergence.
pub fn solve<M, P, const N: usize>(
    model: &M,
    problem: &P,
    initial_guess: [f64; N],
    plan: &Plan,
) -> Result<Solved<M::Input, M::Output, N>, Error>
where
    M: Model,
    P: EquationProblem<N, Input = M::Input, Output = M::Output>,
{
    if plan.strategies.is_empty() {
        return Err(Error::EmptyPlan);
    }

    let mut trace = Trace::default();

    for strategy in &plan.strategies {
        let attempt = match strategy.method {
            Method::Newton(config) => {
                newton::solve_unobserved(model, problem, initial_guess, &config)
            }
            Method::Levenberg(config) => {
                levenberg::solve_unobserved(model, problem, initial_guess, &config)
            }
        };

        match attempt {
            Ok(solution) if solution.status == Status::Converged => {
                return Ok(Solved {
                    strategy: strategy.name,
                    solution,
                    trace,
                });
            }
            Ok(solution) => {
                trace.attempts.push(AttemptRecord {
                    strategy: strategy.name,
                    outcome: AttemptOutcome::DidNotConverge {
                        iters: solution.iters,
                        residual_norm: solution.residual_norm,
                    },
                });
            }
            Err(error) => {
                trace.attempts.push(AttemptRecord {
                    strategy: strategy.name,
                    outcome: AttemptOutcome::Failed {
                        message: error.to_string(),
                    },
                });
            }
        }
    }

    Err(Error::Exhausted { trace })
}
