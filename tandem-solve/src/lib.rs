//! Numerical solvers for Tandem.
//!
//! Everything here operates on the [`Model`] and [`EquationProblem`] traits
//! from `tandem-core`, so the solvers know nothing about the physical
//! systems they are applied to.
//!
//! [`Model`]: tandem_core::Model
//! [`EquationProblem`]: tandem_core::EquationProblem

pub mod equation;
