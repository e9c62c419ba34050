use std::error::Error as StdError;

use thiserror::Error;

use crate::equation::EvalError;

/// Errors that can occur while solving an equation problem.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("non-finite residual at iteration {iter}")]
    NonFiniteResidual { iter: usize },

    #[error("jacobian entry ({row}, {col}) is not finite at iteration {iter}")]
    NonFiniteJacobian {
        row: usize,
        col: usize,
        iter: usize,
    },

    #[error("singular jacobian at iteration {iter}")]
    SingularJacobian { iter: usize },

    #[error("line search stalled at iteration {iter} (residual norm {residual_norm:.3e})")]
    LineSearchStalled { iter: usize, residual_norm: f64 },

    #[error("damping exhausted at iteration {iter} (lambda {lambda:.3e})")]
    DampingExhausted { iter: usize, lambda: f64 },

    #[error("failed to compute input")]
    Input(#[source] Box<dyn StdError + Send + Sync>),

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("failed to compute residual")]
    Residual(#[source] Box<dyn StdError + Send + Sync>),
}

impl<IE, ME, RE> From<EvalError<IE, ME, RE>> for Error
where
    IE: StdError + Send + Sync + 'static,
    ME: StdError + Send + Sync + 'static,
    RE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<IE, ME, RE>) -> Self {
        match err {
            EvalError::Input(e) => Self::Input(Box::new(e)),
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Residual(e) => Self::Residual(Box::new(e)),
        }
    }
}
