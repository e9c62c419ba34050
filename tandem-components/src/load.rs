//! The complex impedance load shared by both machines.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the load model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("load impedance has zero magnitude; admittance is undefined")]
    ZeroImpedance,
}

/// A fixed series R–X load on the common bus.
///
/// Positive reactance is inductive, negative is capacitive. A load with
/// zero-magnitude impedance is representable but unusable: every
/// admittance-based operation reports [`LoadError::ZeroImpedance`] instead
/// of silently dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Load {
    /// Load resistance, Ω.
    pub resistance: f64,
    /// Load reactance, Ω; positive inductive, negative capacitive.
    pub reactance: f64,
}

impl Load {
    #[must_use]
    pub fn new(resistance: f64, reactance: f64) -> Self {
        Self {
            resistance,
            reactance,
        }
    }

    /// Complex impedance `r + j·x`, Ω.
    #[must_use]
    pub fn impedance(&self) -> Complex64 {
        Complex64::new(self.resistance, self.reactance)
    }

    /// Complex admittance `1/Z`, S.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ZeroImpedance`] when the impedance magnitude is
    /// zero.
    pub fn admittance(&self) -> Result<Complex64, LoadError> {
        let z = self.impedance();
        if z.norm_sqr() == 0.0 {
            return Err(LoadError::ZeroImpedance);
        }
        Ok(z.inv())
    }

    /// Load current drawn at the given bus voltage, A.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ZeroImpedance`] when the impedance magnitude is
    /// zero.
    pub fn current(&self, voltage: Complex64) -> Result<Complex64, LoadError> {
        Ok(voltage * self.admittance()?)
    }

    /// Complex power consumed at the given bus voltage, `V·conj(I)`.
    ///
    /// The real part is active power (W), the imaginary part reactive
    /// power (var).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::ZeroImpedance`] when the impedance magnitude is
    /// zero.
    pub fn power(&self, voltage: Complex64) -> Result<Complex64, LoadError> {
        Ok(voltage * self.current(voltage)?.conj())
    }
}
