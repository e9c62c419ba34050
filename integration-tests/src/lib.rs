//! Shared fixtures for the cross-crate scenario tests.
//!
//! The reference machine mirrors the workbook example the plant was built
//! around: a 10 kVA, 440 V, 4-pole machine with a linear 100 V/A
//! magnetization curve, operated at 2 A of field current (200 V internal
//! EMF) with an 8 kW prime mover.

use num_complex::Complex64;

use tandem_components::generator::{CurvePoint, GeneratorSpec};
use tandem_components::load::Load;
use tandem_components::plant::ParallelPlant;

/// The reference machine spec.
#[must_use]
pub fn reference_spec() -> GeneratorSpec {
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

/// Two identical reference machines on the given load.
#[must_use]
pub fn twin_plant(load: Load) -> ParallelPlant {
    ParallelPlant::new(reference_spec(), reference_spec(), load).unwrap()
}

/// Two identical machines with an overridden prime-mover target.
#[must_use]
pub fn twin_plant_with_target(load: Load, p_motor: f64) -> ParallelPlant {
    let spec = GeneratorSpec {
        p_motor,
        ..reference_spec()
    };
    ParallelPlant::new(spec.clone(), spec, load).unwrap()
}

/// The internal power each machine produces in the symmetric
/// circuit-consistent state `IA = Y·EA/(2 + Y·Z)`, `VT = EA − Z·IA`.
///
/// A plant whose derated power target equals this value has an exact
/// steady-state root, which makes it the fixture of choice for tight
/// circuit-law assertions.
#[must_use]
pub fn symmetric_internal_power(load: Load) -> f64 {
    let spec = reference_spec();
    let emf = Complex64::new(200.0, 0.0);
    let z = Complex64::new(spec.ra, spec.xs);
    let y = load.impedance().inv();
    let ia = y * emf / (Complex64::new(2.0, 0.0) + y * z);

    (emf * ia.conj()).re
}
