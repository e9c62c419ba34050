//! Synchronous generator parameters and the validated machine model.

mod magnetization;

pub use magnetization::{CurveError, MagnetizationCurve, SATURATION_CEILING};

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One sample of the open-circuit magnetization characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Field (excitation) current, A.
    pub field_current: f64,
    /// Open-circuit EMF at that excitation, V.
    pub emf: f64,
}

/// The full parameter record for one machine, as collected from the user.
///
/// Field units are fixed by this type: ohms, volt-amperes, volts, watts,
/// hertz, and amperes. The record itself is inert data; validation happens
/// once, when a [`Generator`] is constructed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSpec {
    /// Armature resistance, Ω.
    pub ra: f64,
    /// Synchronous reactance, Ω.
    pub xs: f64,
    /// Nominal apparent power, VA.
    pub s_nom: f64,
    /// Nominal line voltage, V.
    pub v_nom: f64,
    /// Nominal power factor, in (0, 1].
    pub fp_nom: f64,
    /// Pole count; even and positive.
    pub poles: u32,
    /// Sampled magnetization characteristic, strictly increasing in field
    /// current, at least 3 points.
    pub field_curve: Vec<CurvePoint>,
    /// Operating electrical frequency, Hz.
    pub f_sc: f64,
    /// Operating-point field current, A.
    pub if_op: f64,
    /// Core loss, W. Reported, not consumed by the solve.
    pub p_core: f64,
    /// Friction and windage loss, W. Reported, not consumed by the solve.
    pub p_friction: f64,
    /// Miscellaneous loss, W. Reported, not consumed by the solve.
    pub p_misc: f64,
    /// Mechanical input power target from the prime mover, W.
    pub p_motor: f64,
}

/// Errors raised when validating a [`GeneratorSpec`].
#[derive(Debug, Error, PartialEq)]
pub enum GeneratorSpecError {
    #[error("{field} must be a positive, finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("nominal power factor must be in (0, 1], got {value}")]
    PowerFactorOutOfRange { value: f64 },

    #[error("pole count must be even and positive, got {poles}")]
    InvalidPoleCount { poles: u32 },

    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// A validated synchronous machine: the spec plus its compiled
/// magnetization characteristic.
///
/// Construction checks every invariant the solve relies on, so everything
/// downstream can treat the machine as well-formed.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    spec: GeneratorSpec,
    curve: MagnetizationCurve,
}

impl Generator {
    /// Validates the spec and compiles its magnetization curve.
    ///
    /// # Errors
    ///
    /// Returns a [`GeneratorSpecError`] describing the first invariant the
    /// spec violates.
    pub fn new(spec: GeneratorSpec) -> Result<Self, GeneratorSpecError> {
        for (field, value) in [
            ("armature resistance", spec.ra),
            ("synchronous reactance", spec.xs),
            ("nominal apparent power", spec.s_nom),
            ("nominal voltage", spec.v_nom),
            ("operating frequency", spec.f_sc),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeneratorSpecError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("operating field current", spec.if_op),
            ("core loss", spec.p_core),
            ("friction loss", spec.p_friction),
            ("miscellaneous loss", spec.p_misc),
            ("prime mover power", spec.p_motor),
        ] {
            if !value.is_finite() {
                return Err(GeneratorSpecError::NotFinite { field, value });
            }
        }
        if !spec.fp_nom.is_finite() || spec.fp_nom <= 0.0 || spec.fp_nom > 1.0 {
            return Err(GeneratorSpecError::PowerFactorOutOfRange { value: spec.fp_nom });
        }
        if spec.poles == 0 || spec.poles % 2 != 0 {
            return Err(GeneratorSpecError::InvalidPoleCount { poles: spec.poles });
        }

        let curve = MagnetizationCurve::new(&spec.field_curve)?;

        Ok(Self { spec, curve })
    }

    /// The validated parameter record.
    #[must_use]
    pub fn spec(&self) -> &GeneratorSpec {
        &self.spec
    }

    /// The compiled magnetization characteristic.
    #[must_use]
    pub fn magnetization(&self) -> &MagnetizationCurve {
        &self.curve
    }

    /// Internal EMF magnitude (V) at an arbitrary field current (A).
    #[must_use]
    pub fn emf_at(&self, field_current: f64) -> f64 {
        self.curve.emf_at(field_current)
    }

    /// Internal EMF magnitude (V) at the operating field current.
    #[must_use]
    pub fn operating_emf(&self) -> f64 {
        self.curve.emf_at(self.spec.if_op)
    }

    /// Equivalent-circuit impedance `ra + j·xs`, Ω.
    #[must_use]
    pub fn impedance(&self) -> Complex64 {
        Complex64::new(self.spec.ra, self.spec.xs)
    }

    /// Nominal phase voltage `v_nom/√3`, V (Y connection).
    #[must_use]
    pub fn nominal_phase_voltage(&self) -> f64 {
        self.spec.v_nom / 3.0_f64.sqrt()
    }

    /// Synchronous angular speed `2πf/(poles/2)`, rad/s.
    #[must_use]
    pub fn synchronous_speed(&self) -> f64 {
        2.0 * PI * self.spec.f_sc / (f64::from(self.spec.poles) / 2.0)
    }

    /// Three-phase copper loss `3·|ia|²·ra`, W.
    #[must_use]
    pub fn copper_loss(&self, armature_current: Complex64) -> f64 {
        3.0 * armature_current.norm_sqr() * self.spec.ra
    }
}
