//! Steady-state synchronous machine components for Tandem.
//!
//! The centerpiece is [`plant::ParallelPlant`]: two synchronous generators
//! feeding a common load in parallel. Solving the plant finds the
//! self-consistent operating point — armature currents, bus voltage, and
//! power angles — that satisfies phasor circuit law, current balance at
//! the bus, and a soft mechanical power target per machine, then expands
//! that root into a fully unit-typed report.
//!
//! The supporting models stand alone: [`generator`] holds the machine
//! parameters and the magnetization characteristic, [`load`] the complex
//! impedance of the shared load, and [`interpolation`] the cubic spline
//! the magnetization curve is built on.

pub mod generator;
pub mod interpolation;
pub mod load;
pub mod plant;

pub use generator::{Generator, GeneratorSpec, GeneratorSpecError};
pub use load::{Load, LoadError};
pub use plant::{GeneratorId, ParallelPlant, PlantReport, SolveError};
