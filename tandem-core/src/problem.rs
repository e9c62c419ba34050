/// Defines a system of equations to be solved against a model.
///
/// An equation problem maps solver variables `x: [f64; N]` to a model
/// input, and computes `N` residuals from the resulting input/output pair.
/// Solvers drive those residuals toward zero; a root of the residual
/// function is a solution of the problem.
///
/// Splitting the mapping in two keeps the model itself reusable: the model
/// knows nothing about which of its quantities are constrained, and the
/// problem knows nothing about how the model computes them.
pub trait EquationProblem<const N: usize> {
    type Input;
    type Output;
    type InputError: std::error::Error + Send + Sync + 'static;
    type ResidualError: std::error::Error + Send + Sync + 'static;

    /// Builds the model input from solver variables.
    ///
    /// # Errors
    ///
    /// Returns [`Self::InputError`] if an input cannot be constructed from
    /// the given variables.
    fn input(&self, x: &[f64; N]) -> Result<Self::Input, Self::InputError>;

    /// Computes residuals from a model input and its output.
    ///
    /// A residual of zero in every component means the corresponding `x`
    /// is a solution.
    ///
    /// # Errors
    ///
    /// Returns [`Self::ResidualError`] if the residuals cannot be computed.
    fn residuals(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; N], Self::ResidualError>;
}
