use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use uom::si::angle::radian;
use uom::si::angular_velocity::radian_per_second;
use uom::si::electric_current::ampere;
use uom::si::f64::{Angle, AngularVelocity, ElectricCurrent, Frequency, Power, Ratio, Torque};
use uom::si::frequency::hertz;
use uom::si::power::watt;
use uom::si::ratio::ratio;
use uom::si::torque::newton_meter;

use tandem_solve::equation::fallback::Trace;

use crate::load::LoadError;
use crate::plant::{OperatingPoint, ParallelPlant};

/// Stable identifier for one of the two machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorId {
    One,
    Two,
}

impl GeneratorId {
    pub(crate) fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

/// Everything derived for one machine at the solved operating point.
///
/// Phasor fields are RMS phase quantities in volts and amperes; scalar
/// fields carry their units in the type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorReport {
    pub id: GeneratorId,
    /// Armature current phasor, A.
    pub armature_current: Complex64,
    /// Line current phasor, A (equal to the armature current for the
    /// assumed Y connection).
    pub line_current: Complex64,
    /// Operating field current.
    pub field_current: ElectricCurrent,
    /// Internal EMF phasor, V.
    pub emf: Complex64,
    /// Terminal (bus) voltage phasor, V.
    pub terminal_voltage: Complex64,
    /// Phase voltage phasor, V (equal to the bus voltage for the assumed
    /// balanced system).
    pub phase_voltage: Complex64,
    /// Active power delivered from the internal EMF.
    pub active_power: Power,
    /// Reactive power delivered from the internal EMF (var).
    pub reactive_power: Power,
    /// Apparent power magnitude (VA).
    pub apparent_power: Power,
    /// Power angle of the internal EMF relative to the bus.
    pub power_angle: Angle,
    /// Induced electromagnetic torque.
    pub induced_torque: Torque,
    /// Applied shaft torque (equal to the induced torque at steady state).
    pub applied_torque: Torque,
    /// Synchronous angular speed.
    pub synchronous_speed: AngularVelocity,
    /// Electrical frequency.
    pub electrical_frequency: Frequency,
    /// Three-phase armature copper loss.
    pub copper_loss: Power,
    /// Power factor `P/S`; zero when the apparent power is exactly zero.
    pub power_factor: Ratio,
    /// Efficiency `P/(P + P_cu)`; zero when the denominator is exactly
    /// zero.
    pub efficiency: Ratio,
    /// Core loss from the spec, carried through for reporting.
    pub core_loss: Power,
    /// Friction and windage loss from the spec, carried through for
    /// reporting.
    pub friction_loss: Power,
    /// Miscellaneous loss from the spec, carried through for reporting.
    pub miscellaneous_loss: Power,
}

/// Quantities derived for the shared load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Load current phasor, A.
    pub current: Complex64,
    /// Active power consumed.
    pub active_power: Power,
    /// Reactive power consumed (var).
    pub reactive_power: Power,
    /// Apparent power magnitude (VA).
    pub apparent_power: Power,
    /// Power factor `P/S`.
    ///
    /// Defaults to unity when the apparent power is exactly zero — a
    /// reporting convention, not a physical statement about an unloaded
    /// bus.
    pub power_factor: Ratio,
}

/// Bus-level aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    /// Solved bus voltage phasor, V.
    pub bus_voltage: Complex64,
    /// System frequency, the mean of the two machines' operating
    /// frequencies.
    pub frequency: Frequency,
    /// Total generated active power, `P₁ + P₂` by construction.
    pub active_power: Power,
    /// Total generated reactive power, `Q₁ + Q₂` by construction.
    pub reactive_power: Power,
    /// Total losses, `P_total − P_load` by construction.
    pub losses: Power,
}

/// One line of the solver's attempt history, in display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub strategy: String,
    pub outcome: String,
}

/// How the operating point was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveDiagnostics {
    /// Name of the strategy that converged.
    pub strategy: String,
    /// Iterations used by the converging strategy.
    pub iterations: usize,
    /// Largest absolute residual at the accepted operating point.
    pub residual_norm: f64,
    /// Strategies attempted and abandoned before the converging one.
    pub attempts: Vec<AttemptSummary>,
}

impl SolveDiagnostics {
    pub(crate) fn new(
        strategy: &str,
        iterations: usize,
        residual_norm: f64,
        trace: &Trace,
    ) -> Self {
        Self {
            strategy: strategy.to_owned(),
            iterations,
            residual_norm,
            attempts: trace
                .attempts
                .iter()
                .map(|attempt| AttemptSummary {
                    strategy: attempt.strategy.to_owned(),
                    outcome: attempt.outcome.to_string(),
                })
                .collect(),
        }
    }
}

/// The complete solved picture of the plant, the one artifact handed to
/// presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantReport {
    pub generators: [GeneratorReport; 2],
    pub load: LoadReport,
    pub system: SystemReport,
    pub solve: SolveDiagnostics,
}

impl PlantReport {
    /// The sub-report for one machine.
    #[must_use]
    pub fn generator(&self, id: GeneratorId) -> &GeneratorReport {
        &self.generators[id.index()]
    }
}

/// Expands a solved operating point into the full report.
pub(crate) fn derive(
    plant: &ParallelPlant,
    point: &OperatingPoint,
    solve: SolveDiagnostics,
) -> Result<PlantReport, LoadError> {
    let generators = [
        derive_generator(plant, point, GeneratorId::One),
        derive_generator(plant, point, GeneratorId::Two),
    ];

    let load_current = plant.load().current(point.vt)?;
    let s_load = point.vt * load_current.conj();
    let p_load = s_load.re;
    let load = LoadReport {
        current: load_current,
        active_power: Power::new::<watt>(p_load),
        reactive_power: Power::new::<watt>(s_load.im),
        apparent_power: Power::new::<watt>(s_load.norm()),
        power_factor: Ratio::new::<ratio>(if s_load.norm() > 0.0 {
            p_load / s_load.norm()
        } else {
            1.0
        }),
    };

    let f_1 = plant.generator_1().spec().f_sc;
    let f_2 = plant.generator_2().spec().f_sc;
    let p_1 = generators[0].active_power.get::<watt>();
    let p_2 = generators[1].active_power.get::<watt>();
    let q_1 = generators[0].reactive_power.get::<watt>();
    let q_2 = generators[1].reactive_power.get::<watt>();
    let system = SystemReport {
        bus_voltage: point.vt,
        frequency: Frequency::new::<hertz>((f_1 + f_2) / 2.0),
        active_power: Power::new::<watt>(p_1 + p_2),
        reactive_power: Power::new::<watt>(q_1 + q_2),
        losses: Power::new::<watt>(p_1 + p_2 - p_load),
    };

    Ok(PlantReport {
        generators,
        load,
        system,
        solve,
    })
}

fn derive_generator(
    plant: &ParallelPlant,
    point: &OperatingPoint,
    id: GeneratorId,
) -> GeneratorReport {
    let (machine, ia, delta) = match id {
        GeneratorId::One => (plant.generator_1(), point.ia_1, point.delta_1),
        GeneratorId::Two => (plant.generator_2(), point.ia_2, point.delta_2),
    };
    let spec = machine.spec();

    let emf = Complex64::from_polar(machine.operating_emf(), delta);
    let s_complex = emf * ia.conj();
    let p = s_complex.re;
    let q = s_complex.im;
    let s = s_complex.norm();

    let omega = machine.synchronous_speed();
    let torque = p / omega;
    let p_cu = machine.copper_loss(ia);

    GeneratorReport {
        id,
        armature_current: ia,
        line_current: ia,
        field_current: ElectricCurrent::new::<ampere>(spec.if_op),
        emf,
        terminal_voltage: point.vt,
        phase_voltage: point.vt,
        active_power: Power::new::<watt>(p),
        reactive_power: Power::new::<watt>(q),
        apparent_power: Power::new::<watt>(s),
        power_angle: Angle::new::<radian>(delta),
        induced_torque: Torque::new::<newton_meter>(torque),
        applied_torque: Torque::new::<newton_meter>(torque),
        synchronous_speed: AngularVelocity::new::<radian_per_second>(omega),
        electrical_frequency: Frequency::new::<hertz>(spec.f_sc),
        copper_loss: Power::new::<watt>(p_cu),
        power_factor: Ratio::new::<ratio>(if s != 0.0 { p / s } else { 0.0 }),
        efficiency: Ratio::new::<ratio>(if p + p_cu != 0.0 { p / (p + p_cu) } else { 0.0 }),
        core_loss: Power::new::<watt>(spec.p_core),
        friction_loss: Power::new::<watt>(spec.p_friction),
        miscellaneous_loss: Power::new::<watt>(spec.p_misc),
    }
}
