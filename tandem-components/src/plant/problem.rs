use std::convert::Infallible;

use num_complex::Complex64;

use tandem_core::{EquationProblem, Model};

use crate::load::LoadError;
use crate::plant::{OperatingPoint, ParallelPlant};

/// Fraction of the stated prime-mover power each machine is asked to
/// deliver.
///
/// The softened target (together with the normalization in the power
/// residuals) is a deliberate convergence aid, not a physical law; solved
/// powers are biased below the stated mechanical input accordingly.
pub const POWER_TARGET_DERATING: f64 = 0.9;

/// The physical quantities a candidate operating point implies.
///
/// Everything downstream of the state vector and upstream of the
/// residuals: EMF phasors from each machine's excitation and power angle,
/// the current the load draws at the candidate bus voltage, and each
/// machine's internal power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantQuantities {
    /// Generator 1 internal EMF phasor, V.
    pub emf_1: Complex64,
    /// Generator 2 internal EMF phasor, V.
    pub emf_2: Complex64,
    /// Current drawn by the load at the candidate bus voltage, A.
    pub load_current: Complex64,
    /// Generator 1 internal power `Re(EA·conj(IA))`, W.
    pub internal_power_1: f64,
    /// Generator 2 internal power `Re(EA·conj(IA))`, W.
    pub internal_power_2: f64,
}

impl Model for ParallelPlant {
    type Input = OperatingPoint;
    type Output = PlantQuantities;
    type Error = LoadError;

    fn call(&self, point: &Self::Input) -> Result<Self::Output, Self::Error> {
        let emf_1 = Complex64::from_polar(self.generator_1().operating_emf(), point.delta_1);
        let emf_2 = Complex64::from_polar(self.generator_2().operating_emf(), point.delta_2);
        let load_current = self.load().current(point.vt)?;

        Ok(PlantQuantities {
            emf_1,
            emf_2,
            load_current,
            internal_power_1: (emf_1 * point.ia_1.conj()).re,
            internal_power_2: (emf_2 * point.ia_2.conj()).re,
        })
    }
}

/// The residual system whose root is the steady-state operating point.
///
/// Eight real equations over eight real unknowns:
///
/// 1–2. generator 1 phasor circuit law `EA₁ − VT − Z₁·IA₁ = 0`
/// 3–4. generator 2 phasor circuit law `EA₂ − VT − Z₂·IA₂ = 0`
/// 5–6. current balance at the bus `IA₁ + IA₂ − I_load(VT) = 0`
/// 7–8. soft power matching per machine,
///      `(P − 0.9·p_motor) / max(1, |0.9·p_motor|) = 0`
pub struct SteadyStateProblem<'a> {
    plant: &'a ParallelPlant,
}

impl<'a> SteadyStateProblem<'a> {
    #[must_use]
    pub fn new(plant: &'a ParallelPlant) -> Self {
        Self { plant }
    }
}

impl EquationProblem<8> for SteadyStateProblem<'_> {
    type Input = OperatingPoint;
    type Output = PlantQuantities;
    type InputError = Infallible;
    type ResidualError = Infallible;

    fn input(&self, x: &[f64; 8]) -> Result<Self::Input, Self::InputError> {
        Ok(OperatingPoint::from_vector(x))
    }

    fn residuals(
        &self,
        point: &Self::Input,
        quantities: &Self::Output,
    ) -> Result<[f64; 8], Self::ResidualError> {
        let circuit_1 =
            quantities.emf_1 - point.vt - self.plant.generator_1().impedance() * point.ia_1;
        let circuit_2 =
            quantities.emf_2 - point.vt - self.plant.generator_2().impedance() * point.ia_2;
        let balance = point.ia_1 + point.ia_2 - quantities.load_current;

        let target_1 = POWER_TARGET_DERATING * self.plant.generator_1().spec().p_motor;
        let target_2 = POWER_TARGET_DERATING * self.plant.generator_2().spec().p_motor;
        let power_1 = (quantities.internal_power_1 - target_1) / target_1.abs().max(1.0);
        let power_2 = (quantities.internal_power_2 - target_2) / target_2.abs().max(1.0);

        Ok([
            circuit_1.re,
            circuit_1.im,
            circuit_2.re,
            circuit_2.im,
            balance.re,
            balance.im,
            power_1,
            power_2,
        ])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::load::Load;
    use crate::plant::test_fixtures::{parallel_plant, spec};

    use super::*;

    /// A symmetric circuit-consistent state: with identical machines and a
    /// common power angle, `IA = Y·EA/(2 + Y·Z)` and `VT = EA − Z·IA`
    /// satisfy both circuit laws and current balance exactly.
    fn consistent_point(plant: &ParallelPlant, delta: f64) -> OperatingPoint {
        let emf = Complex64::from_polar(plant.generator_1().operating_emf(), delta);
        let z = plant.generator_1().impedance();
        let y = plant.load().admittance().unwrap();
        let ia = y * emf / (Complex64::new(2.0, 0.0) + y * z);
        let vt = emf - z * ia;

        OperatingPoint {
            ia_1: ia,
            ia_2: ia,
            vt,
            delta_1: delta,
            delta_2: delta,
        }
    }

    #[test]
    fn circuit_and_balance_residuals_vanish_at_a_consistent_state() {
        let plant = parallel_plant(spec(), spec(), Load::new(100.0, 0.0));
        let point = consistent_point(&plant, 0.17);

        let quantities = plant.call(&point).unwrap();
        let problem = SteadyStateProblem::new(&plant);
        let residuals = problem.residuals(&point, &quantities).unwrap();

        for residual in &residuals[..6] {
            assert_relative_eq!(*residual, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn power_residuals_are_normalized_deviations_from_the_derated_target() {
        let plant = parallel_plant(spec(), spec(), Load::new(100.0, 0.0));
        let point = consistent_point(&plant, 0.0);

        let quantities = plant.call(&point).unwrap();
        let problem = SteadyStateProblem::new(&plant);
        let residuals = problem.residuals(&point, &quantities).unwrap();

        let target = POWER_TARGET_DERATING * plant.generator_1().spec().p_motor;
        let expected = (quantities.internal_power_1 - target) / target.abs().max(1.0);
        assert_relative_eq!(residuals[6], expected, epsilon = 1e-12);
        assert_relative_eq!(residuals[6], residuals[7], epsilon = 1e-12);
    }

    #[test]
    fn emf_phase_follows_the_power_angle() {
        let plant = parallel_plant(spec(), spec(), Load::new(100.0, 0.0));
        let point = OperatingPoint {
            delta_1: 0.3,
            delta_2: -0.2,
            ..consistent_point(&plant, 0.0)
        };

        let quantities = plant.call(&point).unwrap();
        assert_relative_eq!(quantities.emf_1.arg(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(quantities.emf_2.arg(), -0.2, epsilon = 1e-12);
        assert_relative_eq!(
            quantities.emf_1.norm(),
            plant.generator_1().operating_emf(),
            epsilon = 1e-12
        );
    }
}
