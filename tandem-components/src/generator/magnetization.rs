use ndarray::Array1;
use thiserror::Error;

use crate::generator::CurvePoint;
use crate::interpolation::{CubicSpline, SplineError};

/// Extrapolated EMF above the sampled range is capped at this multiple of
/// the last sampled EMF, representing magnetic saturation.
pub const SATURATION_CEILING: f64 = 1.3;

/// Errors raised when constructing a [`MagnetizationCurve`].
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error(transparent)]
    Samples(#[from] SplineError),

    #[error("first field current must be positive, got {value}")]
    NonPositiveFirstFieldCurrent { value: f64 },
}

/// The open-circuit magnetization characteristic of one machine: field
/// current in, internal EMF magnitude out.
///
/// Inside the sampled range the curve is a natural cubic spline, exact at
/// every sample. Below the range the characteristic is taken as linear
/// through the origin with the slope of the first sample — the unsaturated
/// behavior near zero excitation. Above the range it continues with the
/// slope of the last two samples and is then clamped to
/// [`SATURATION_CEILING`] times the last sampled EMF, so runaway
/// excitation cannot produce an unphysical EMF.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetizationCurve {
    field_current: Array1<f64>,
    emf: Array1<f64>,
    spline: CubicSpline,
}

impl MagnetizationCurve {
    /// Builds the characteristic from sampled curve points.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] if fewer than 3 points are given, the field
    /// currents are not strictly increasing and positive, or any sample is
    /// non-finite.
    pub fn new(points: &[CurvePoint]) -> Result<Self, CurveError> {
        let field_current =
            Array1::from_iter(points.iter().map(|point| point.field_current));
        let emf = Array1::from_iter(points.iter().map(|point| point.emf));

        let spline = CubicSpline::new(field_current.clone(), emf.clone())?;
        if field_current[0] <= 0.0 {
            return Err(CurveError::NonPositiveFirstFieldCurrent {
                value: field_current[0],
            });
        }

        Ok(Self {
            field_current,
            emf,
            spline,
        })
    }

    /// Internal EMF magnitude (V) for the given field current (A).
    ///
    /// Total over all real inputs: out-of-range field currents are handled
    /// by the extrapolation rules described on the type.
    #[must_use]
    pub fn emf_at(&self, field_current: f64) -> f64 {
        let n = self.field_current.len();

        if field_current < self.field_current[0] {
            let slope = self.emf[0] / self.field_current[0];
            return slope * field_current;
        }

        if field_current > self.field_current[n - 1] {
            let slope = (self.emf[n - 1] - self.emf[n - 2])
                / (self.field_current[n - 1] - self.field_current[n - 2]);
            let extrapolated =
                self.emf[n - 1] + slope * (field_current - self.field_current[n - 1]);
            return extrapolated.min(SATURATION_CEILING * self.emf[n - 1]);
        }

        self.spline.evaluate(field_current)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn points(samples: &[(f64, f64)]) -> Vec<CurvePoint> {
        samples
            .iter()
            .map(|&(field_current, emf)| CurvePoint { field_current, emf })
            .collect()
    }

    #[test]
    fn exact_at_every_control_point() {
        let samples = [(0.5, 55.0), (1.0, 100.0), (2.0, 185.0), (3.0, 255.0), (4.0, 300.0)];
        let curve = MagnetizationCurve::new(&points(&samples)).unwrap();

        for (field_current, emf) in samples {
            assert_relative_eq!(curve.emf_at(field_current), emf, epsilon = 1e-12);
        }
    }

    #[test]
    fn linear_curve_matches_between_samples() {
        let curve =
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (2.0, 200.0), (3.0, 300.0)])).unwrap();

        assert_relative_eq!(curve.emf_at(2.0), 200.0, epsilon = 1e-12);
        assert_relative_eq!(curve.emf_at(2.5), 250.0, epsilon = 1e-12);
    }

    #[test]
    fn below_range_is_linear_through_the_origin() {
        let curve =
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (2.0, 200.0), (3.0, 300.0)])).unwrap();

        assert_relative_eq!(curve.emf_at(0.5), 50.0, epsilon = 1e-12);
        assert_relative_eq!(curve.emf_at(0.0), 0.0);
    }

    #[test]
    fn above_range_follows_final_slope_until_the_ceiling() {
        let curve =
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (2.0, 200.0), (3.0, 300.0)])).unwrap();

        // Just past the last sample the final slope still applies.
        assert_relative_eq!(curve.emf_at(3.5), 350.0, epsilon = 1e-12);
        // Far past it, the saturation ceiling takes over.
        assert_relative_eq!(curve.emf_at(10.0), 390.0, epsilon = 1e-12);
        assert_relative_eq!(curve.emf_at(1e9), 390.0, epsilon = 1e-12);
    }

    #[test]
    fn ceiling_is_never_exceeded() {
        let last_emf = 300.0;
        let curve =
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (2.0, 200.0), (3.0, last_emf)]))
                .unwrap();

        for field_current in [3.1, 4.0, 7.5, 100.0, 1e12] {
            assert!(curve.emf_at(field_current) <= SATURATION_CEILING * last_emf);
        }
    }

    #[test]
    fn rejects_malformed_curves() {
        assert!(matches!(
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (2.0, 200.0)])),
            Err(CurveError::Samples(SplineError::TooFewSamples { len: 2 }))
        ));
        assert!(matches!(
            MagnetizationCurve::new(&points(&[(1.0, 100.0), (1.0, 150.0), (2.0, 200.0)])),
            Err(CurveError::Samples(SplineError::NotStrictlyIncreasing { index: 1 }))
        ));
        assert!(matches!(
            MagnetizationCurve::new(&points(&[(2.0, 100.0), (1.0, 150.0), (3.0, 200.0)])),
            Err(CurveError::Samples(SplineError::NotStrictlyIncreasing { index: 1 }))
        ));
        assert!(matches!(
            MagnetizationCurve::new(&points(&[(0.0, 0.0), (1.0, 150.0), (2.0, 200.0)])),
            Err(CurveError::NonPositiveFirstFieldCurrent { .. })
        ));
    }
}
