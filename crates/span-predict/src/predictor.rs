//! The `BridgePredictor` trait and its request/result types.

use std::time::Instant;

use span_core::Timestamp;

use crate::error::{PredictError, PredictResult};

// ── Request / result shapes ───────────────────────────────────────────────────

/// One prediction request: which bridge, when it will be reached, and the
/// feature vector describing that moment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionInput {
    pub bridge_id: String,
    pub eta: Timestamp,
    pub features: Vec<f64>,
}

/// One prediction: the probability the bridge is open (traversable) at the
/// ETA.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionResult {
    pub bridge_id: String,
    pub eta: Timestamp,
    /// In `[0, 1]`; the constructor clamps.
    pub open_probability: f64,
    /// Optional model confidence in `[0, 1]`.
    pub confidence: Option<f64>,
}

impl PredictionResult {
    pub fn new(
        bridge_id: impl Into<String>,
        eta: Timestamp,
        open_probability: f64,
        confidence: Option<f64>,
    ) -> Self {
        Self {
            bridge_id: bridge_id.into(),
            eta,
            open_probability: open_probability.clamp(0.0, 1.0),
            confidence,
        }
    }
}

/// Result of a batch call, with request-side telemetry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchPredictionResult {
    /// One result per input, in input order.
    pub results: Vec<PredictionResult>,
    pub processing_time_secs: f64,
    pub batch_size: usize,
}

// ── Validation helpers ────────────────────────────────────────────────────────

/// Contract checks applied to a single input.
pub fn validate_input(bridge_id: &str, features: &[f64]) -> PredictResult<()> {
    if bridge_id.is_empty() {
        return Err(PredictError::InvalidInput("empty bridge id".into()));
    }
    if features.is_empty() {
        return Err(PredictError::InvalidInput(format!(
            "empty feature vector for bridge {bridge_id}"
        )));
    }
    if let Some(i) = features.iter().position(|f| !f.is_finite()) {
        return Err(PredictError::InvalidInput(format!(
            "non-finite feature at index {i} for bridge {bridge_id}"
        )));
    }
    Ok(())
}

/// Contract checks applied to a batch.
pub fn validate_batch(inputs: &[PredictionInput], max_batch_size: usize) -> PredictResult<()> {
    if inputs.len() > max_batch_size {
        return Err(PredictError::InvalidInput(format!(
            "batch of {} exceeds predictor limit {max_batch_size}",
            inputs.len()
        )));
    }
    for input in inputs {
        validate_input(&input.bridge_id, &input.features)?;
    }
    Ok(())
}

// ── BridgePredictor ───────────────────────────────────────────────────────────

/// Pluggable bridge-opening predictor.
///
/// Implementations must be `Send + Sync`: a scorer may be shared across
/// worker threads, and batch scoring may be parallelized when the host opts
/// in.  Predictor calls are the engine's only blocking points — hosts on
/// async runtimes should call the scorer through their blocking facility.
///
/// # Required methods
///
/// `predict` and `predict_batch` have default implementations **in terms of
/// each other** — implement at least one or every call recurses.  Simple
/// predictors override `predict`; service-backed ones override
/// `predict_batch` and get the single-shot form for free.
pub trait BridgePredictor: Send + Sync {
    /// Predict a single bridge.  Default: a batch of one.
    fn predict(
        &self,
        bridge_id: &str,
        eta: Timestamp,
        features: &[f64],
    ) -> PredictResult<PredictionResult> {
        let batch = self.predict_batch(&[PredictionInput {
            bridge_id: bridge_id.to_owned(),
            eta,
            features: features.to_vec(),
        }])?;
        batch.results.into_iter().next().ok_or_else(|| {
            PredictError::Failed(format!("batch of 1 returned no result for {bridge_id}"))
        })
    }

    /// Predict a batch, preserving input order.  Default: `predict` per
    /// input.
    fn predict_batch(&self, inputs: &[PredictionInput]) -> PredictResult<BatchPredictionResult> {
        validate_batch(inputs, self.max_batch_size())?;
        let started = Instant::now();
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            results.push(self.predict(&input.bridge_id, input.eta, &input.features)?);
        }
        Ok(BatchPredictionResult {
            batch_size: results.len(),
            results,
            processing_time_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Probability substituted for bridges this predictor cannot handle and
    /// for policy-rejected bridges.
    fn default_probability(&self) -> f64 {
        0.5
    }

    /// Whether this predictor can handle `bridge_id`.
    fn supports(&self, bridge_id: &str) -> bool;

    /// Upper bound on `predict_batch` input size.
    fn max_batch_size(&self) -> usize {
        64
    }
}
