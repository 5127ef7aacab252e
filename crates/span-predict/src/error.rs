//! Predictor-contract error type.

use thiserror::Error;

/// Errors produced at the predictor seam.
#[derive(Debug, Error)]
pub enum PredictError {
    /// A request failed contract validation before reaching the predictor.
    #[error("invalid prediction input: {0}")]
    InvalidInput(String),

    /// The predictor itself failed.  Implementations wrap their internal
    /// errors into this variant; the scorer re-wraps it exactly once.
    #[error("prediction failed: {0}")]
    Failed(String),
}

pub type PredictResult<T> = Result<T, PredictError>;
