//! Define Errors

use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, KrylovSchurError>;

/// Master Error type of this crate
#[derive(Debug, Error)]
pub enum KrylovSchurError {
    /// Construction-time argument out of its documented range.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// `compute` was called before `init`.
    #[error("solver was not initialized: call init() before compute()")]
    NotInitialized,

    /// The in-crate Schur-vector back-substitution hit a singular block.
    #[error("numerical failure while computing Ritz vectors: {message}")]
    NumericalFailure { message: String },
}
