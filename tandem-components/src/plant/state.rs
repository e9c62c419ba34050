use num_complex::Complex64;

/// The solver state of the two-generator bus: both armature currents, the
/// bus voltage, and both power angles.
///
/// Packs to and from the flat vector the equation solvers work on, with
/// the layout
/// `[ia1_re, ia1_im, ia2_re, ia2_im, vt_re, vt_im, delta1, delta2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    /// Generator 1 armature current, A.
    pub ia_1: Complex64,
    /// Generator 2 armature current, A.
    pub ia_2: Complex64,
    /// Bus (terminal) voltage, V.
    pub vt: Complex64,
    /// Generator 1 power angle, rad.
    pub delta_1: f64,
    /// Generator 2 power angle, rad.
    pub delta_2: f64,
}

impl OperatingPoint {
    /// Unpacks an operating point from solver variables.
    #[must_use]
    pub fn from_vector(x: &[f64; 8]) -> Self {
        Self {
            ia_1: Complex64::new(x[0], x[1]),
            ia_2: Complex64::new(x[2], x[3]),
            vt: Complex64::new(x[4], x[5]),
            delta_1: x[6],
            delta_2: x[7],
        }
    }

    /// Packs the operating point into solver variables.
    #[must_use]
    pub fn to_vector(&self) -> [f64; 8] {
        [
            self.ia_1.re,
            self.ia_1.im,
            self.ia_2.re,
            self.ia_2.im,
            self.vt.re,
            self.vt.im,
            self.delta_1,
            self.delta_2,
        ]
    }
}
