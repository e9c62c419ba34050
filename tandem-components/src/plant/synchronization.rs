use serde::{Deserialize, Serialize};
use uom::si::f64::{Frequency, Ratio};
use uom::si::frequency::hertz;
use uom::si::ratio::ratio;

use crate::generator::Generator;

/// Phase-voltage magnitudes must agree within this relative tolerance for
/// the machines to be considered parallelable.
pub const VOLTAGE_TOLERANCE: f64 = 0.05;

/// Operating frequencies must agree within this many hertz.
pub const FREQUENCY_TOLERANCE_HZ: f64 = 0.1;

/// The textbook paralleling conditions, evaluated from the two machine
/// specs alone — no solve required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynchronizationCheck {
    /// Whether the nominal phase voltages agree within
    /// [`VOLTAGE_TOLERANCE`].
    pub voltage_match: bool,
    /// Relative phase-voltage difference, against machine 1.
    pub voltage_difference: Ratio,
    /// Whether the operating frequencies agree within
    /// [`FREQUENCY_TOLERANCE_HZ`].
    pub frequency_match: bool,
    /// Absolute difference of the operating frequencies.
    pub frequency_difference: Frequency,
    /// Whether the machines share a phase sequence. Both are taken as ABC,
    /// so this always holds for specs this crate can express.
    pub phase_sequence_match: bool,
}

pub(crate) fn check(generator_1: &Generator, generator_2: &Generator) -> SynchronizationCheck {
    let v_1 = generator_1.nominal_phase_voltage();
    let v_2 = generator_2.nominal_phase_voltage();
    let voltage_difference = (v_1 - v_2).abs() / v_1;

    let f_1 = generator_1.spec().f_sc;
    let f_2 = generator_2.spec().f_sc;
    let frequency_difference = (f_1 - f_2).abs();

    SynchronizationCheck {
        voltage_match: voltage_difference < VOLTAGE_TOLERANCE,
        voltage_difference: Ratio::new::<ratio>(voltage_difference),
        frequency_match: frequency_difference < FREQUENCY_TOLERANCE_HZ,
        frequency_difference: Frequency::new::<hertz>(frequency_difference),
        phase_sequence_match: true,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::generator::GeneratorSpec;
    use crate::load::Load;
    use crate::plant::test_fixtures::{parallel_plant, spec};

    use super::*;

    #[test]
    fn identical_machines_satisfy_every_condition() {
        let plant = parallel_plant(spec(), spec(), Load::new(100.0, 0.0));
        let check = plant.check_synchronization();

        assert!(check.voltage_match);
        assert!(check.frequency_match);
        assert!(check.phase_sequence_match);
        assert_relative_eq!(check.voltage_difference.get::<ratio>(), 0.0);
        assert_relative_eq!(check.frequency_difference.get::<hertz>(), 0.0);
    }

    #[test]
    fn mismatched_voltage_and_frequency_are_flagged() {
        let other = GeneratorSpec {
            v_nom: 480.0,
            f_sc: 50.0,
            ..spec()
        };
        let plant = parallel_plant(spec(), other, Load::new(100.0, 0.0));
        let check = plant.check_synchronization();

        assert!(!check.voltage_match);
        assert!(check.voltage_difference.get::<ratio>() > VOLTAGE_TOLERANCE);
        assert!(!check.frequency_match);
        assert_relative_eq!(check.frequency_difference.get::<hertz>(), 10.0);
    }
}
