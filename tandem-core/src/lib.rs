//! Core traits and types for Tandem.
//!
//! This crate defines the shared abstractions that solvers and models
//! build on:
//!
//! - [`Model`] — a callable that maps a typed input to a typed output
//! - [`Snapshot`] — a captured input/output pair from a model call
//! - [`EquationProblem`] — adapts solver variables to model inputs and
//!   extracts residuals from outputs
//! - [`Observer`] — receives solver events and optionally returns control
//!   actions

mod model;
mod observer;
mod problem;

pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use problem::EquationProblem;
