//! Two synchronous generators in parallel on a common bus.
//!
//! [`ParallelPlant`] owns the validated machines and the shared load,
//! implements the plant physics as a [`Model`], and exposes the
//! orchestrated solve: walk the fallback plan of root-finding strategies,
//! then expand the converged operating point into a [`PlantReport`].
//!
//! [`Model`]: tandem_core::Model

mod problem;
mod report;
mod sharing;
mod state;
mod synchronization;

pub use problem::{POWER_TARGET_DERATING, PlantQuantities, SteadyStateProblem};
pub use report::{
    AttemptSummary, GeneratorId, GeneratorReport, LoadReport, PlantReport, SolveDiagnostics,
    SystemReport,
};
pub use sharing::{LoadSharing, STABILITY_LIMIT_DEGREES};
pub use state::OperatingPoint;
pub use synchronization::{
    FREQUENCY_TOLERANCE_HZ, SynchronizationCheck, VOLTAGE_TOLERANCE,
};

use thiserror::Error;

use tandem_solve::equation::fallback::{self, Plan};

use crate::generator::{Generator, GeneratorSpec, GeneratorSpecError};
use crate::load::{Load, LoadError};

/// Errors raised by a plant solve.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Every configured strategy failed; the trace inside describes each
    /// attempt.
    #[error(transparent)]
    Solver(#[from] fallback::Error),

    /// The load model failed while deriving the report.
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Two validated machines and the load they feed in parallel.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelPlant {
    generators: [Generator; 2],
    load: Load,
}

impl ParallelPlant {
    /// Validates both specs and assembles the plant.
    ///
    /// # Errors
    ///
    /// Returns the first [`GeneratorSpecError`] either spec violates.
    pub fn new(
        spec_1: GeneratorSpec,
        spec_2: GeneratorSpec,
        load: Load,
    ) -> Result<Self, GeneratorSpecError> {
        Ok(Self::from_generators(
            Generator::new(spec_1)?,
            Generator::new(spec_2)?,
            load,
        ))
    }

    /// Assembles the plant from already validated machines.
    #[must_use]
    pub fn from_generators(generator_1: Generator, generator_2: Generator, load: Load) -> Self {
        Self {
            generators: [generator_1, generator_2],
            load,
        }
    }

    /// One of the machines, by stable identifier.
    #[must_use]
    pub fn generator(&self, id: GeneratorId) -> &Generator {
        &self.generators[id.index()]
    }

    pub(crate) fn generator_1(&self) -> &Generator {
        &self.generators[0]
    }

    pub(crate) fn generator_2(&self) -> &Generator {
        &self.generators[1]
    }

    /// The shared load.
    #[must_use]
    pub fn load(&self) -> &Load {
        &self.load
    }

    /// The default starting state for the solve.
    ///
    /// Bus voltage at the nominal phase magnitude with no reactive
    /// component, armature currents at half the nominal magnitude
    /// `s_nom/(3·v_phase)`, and small nonzero power angles — a state too
    /// close to the zero vector fails to break symmetry and commonly
    /// stalls convergence.
    #[must_use]
    pub fn initial_guess(&self) -> [f64; 8] {
        let v_phase = self.generator_1().nominal_phase_voltage();
        let i_1 = self.generator_1().spec().s_nom / (3.0 * v_phase);
        let i_2 = self.generator_2().spec().s_nom / (3.0 * v_phase);
        let delta = 0.2;

        [
            0.5 * i_1,
            0.0,
            0.5 * i_2,
            0.0,
            v_phase,
            0.0,
            delta,
            delta,
        ]
    }

    /// Solves for the steady-state operating point with the default
    /// strategy plan and initial guess.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Solver`] when every strategy in the plan
    /// fails; the error carries the attempt trace.
    pub fn solve(&self) -> Result<PlantReport, SolveError> {
        self.solve_with(&Plan::default(), self.initial_guess())
    }

    /// Solves with an explicit strategy plan and starting state.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`solve`](Self::solve).
    pub fn solve_with(
        &self,
        plan: &Plan,
        initial_guess: [f64; 8],
    ) -> Result<PlantReport, SolveError> {
        let problem = SteadyStateProblem::new(self);
        let solved = fallback::solve(self, &problem, initial_guess, plan)?;

        let diagnostics = SolveDiagnostics::new(
            solved.strategy,
            solved.solution.iters,
            solved.solution.residual_norm,
            &solved.trace,
        );
        let point = solved.solution.snapshot.input;

        Ok(report::derive(self, &point, diagnostics)?)
    }

    /// Evaluates the textbook paralleling conditions for the two machines.
    #[must_use]
    pub fn check_synchronization(&self) -> SynchronizationCheck {
        synchronization::check(self.generator_1(), self.generator_2())
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::generator::{CurvePoint, GeneratorSpec};
    use crate::load::Load;

    use super::ParallelPlant;

    /// The reference machine used across plant tests: 10 kVA, 440 V, with
    /// a linear 100 V/A magnetization curve and a 2 A operating field
    /// current.
    pub(crate) fn spec() -> GeneratorSpec {
        GeneratorSpec {
            ra: 0.01,
            xs: 0.1,
            s_nom: 10_000.0,
            v_nom: 440.0,
            fp_nom: 0.8,
            poles: 4,
            field_curve: vec![
                CurvePoint { field_current: 1.0, emf: 100.0 },
                CurvePoint { field_current: 2.0, emf: 200.0 },
                CurvePoint { field_current: 3.0, emf: 300.0 },
                CurvePoint { field_current: 4.0, emf: 400.0 },
                CurvePoint { field_current: 5.0, emf: 500.0 },
            ],
            f_sc: 60.0,
            if_op: 2.0,
            p_core: 100.0,
            p_friction: 50.0,
            p_misc: 30.0,
            p_motor: 8_000.0,
        }
    }

    pub(crate) fn parallel_plant(
        spec_1: GeneratorSpec,
        spec_2: GeneratorSpec,
        load: Load,
    ) -> ParallelPlant {
        ParallelPlant::new(spec_1, spec_2, load).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::load::Load;

    use super::test_fixtures::{parallel_plant, spec};
    use super::*;

    #[test]
    fn initial_guess_follows_the_nominal_ratings() {
        let plant = parallel_plant(spec(), spec(), Load::new(100.0, 0.0));
        let guess = plant.initial_guess();

        let v_phase = 440.0 / 3.0_f64.sqrt();
        let i_nom = 10_000.0 / (3.0 * v_phase);
        assert_relative_eq!(guess[0], 0.5 * i_nom, epsilon = 1e-12);
        assert_relative_eq!(guess[2], 0.5 * i_nom, epsilon = 1e-12);
        assert_relative_eq!(guess[4], v_phase, epsilon = 1e-12);
        assert_eq!(guess[5], 0.0);
        assert_eq!(guess[6], 0.2);
        assert_eq!(guess[7], 0.2);
    }

    #[test]
    fn generators_are_addressable_by_stable_id() {
        let other = crate::generator::GeneratorSpec { s_nom: 20_000.0, ..spec() };
        let plant = parallel_plant(spec(), other, Load::new(100.0, 0.0));

        assert_relative_eq!(plant.generator(GeneratorId::One).spec().s_nom, 10_000.0);
        assert_relative_eq!(plant.generator(GeneratorId::Two).spec().s_nom, 20_000.0);
    }
}
