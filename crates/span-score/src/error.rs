//! Scoring error taxonomy.
//!
//! Two recovery classes: *per-route* failures (the route is dropped from a
//! batch and recorded; the rest proceed) and *fatal* ones (configuration,
//! cancellation — the whole call stops).  [`ScoreError::is_per_route`] is
//! the classifier batch scoring uses.

use thiserror::Error;

use span_core::CoreError;

/// Errors produced by the scoring pipeline.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// A route failed contiguity or shape checks.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The predictor failed or broke its contract (wrong result count,
    /// non-finite probability).  Predictor-side errors are wrapped into this
    /// variant exactly once.
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    #[error("feature generation failed: {0}")]
    FeatureGenerationFailed(String),

    /// Batch scoring was invoked with no input.
    #[error("empty path set: {0}")]
    EmptyPathSet(String),

    /// Aggregation produced a non-finite or out-of-range probability.
    #[error("numerical error: {0}")]
    NumericalError(String),

    /// Bridges the predictor declined.  Informational — the default pipeline
    /// substitutes the default probability instead of raising this.
    #[error("unsupported bridges: {}", .0.join(", "))]
    UnsupportedBridges(Vec<String>),

    #[error(transparent)]
    Configuration(#[from] CoreError),

    /// The caller cancelled between routes; caches and metrics were not
    /// touched for the aborted remainder.
    #[error("scoring cancelled")]
    Cancelled,
}

impl ScoreError {
    /// `true` for failures that drop one route from a batch rather than
    /// aborting the batch.
    pub fn is_per_route(&self) -> bool {
        matches!(
            self,
            ScoreError::InvalidPath(_)
                | ScoreError::PredictionFailed(_)
                | ScoreError::FeatureGenerationFailed(_)
                | ScoreError::NumericalError(_)
                | ScoreError::UnsupportedBridges(_)
        )
    }
}

pub type ScoreResult<T> = Result<T, ScoreError>;
