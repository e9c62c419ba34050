//! Solvers for equation problems — finding roots of systems of equations.
//!
//! An [`EquationProblem`] maps solver variables `x: [f64; N]` to model
//! inputs, calls the model, and computes residuals. Solvers in this module
//! drive those residuals toward zero.
//!
//! # Solvers
//!
//! - [`newton`] — damped Newton–Raphson with a forward-difference Jacobian;
//!   fast near a root, fails loudly on singular or stalled iterations
//! - [`levenberg`] — Levenberg–Marquardt damped least squares; tolerant of
//!   rank-deficient Jacobians and of systems with no exact root, where it
//!   settles on the least-squares compromise
//! - [`fallback`] — drives an ordered plan of named solver configurations,
//!   accepting the first that converges and recording every attempt
//!
//! [`EquationProblem`]: tandem_core::EquationProblem

mod error;
mod evaluate;
mod jacobian;
mod linear;
mod solution;

pub use error::Error;
pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};
pub use solution::{Solution, Status};

pub mod fallback;
pub mod levenberg;
pub mod newton;
