//! Engine configuration.
//!
//! Typically built in code (or deserialized from the host's config file via
//! the `serde` feature) and validated once at scorer construction.  Every
//! violation is reported as [`CoreError::Configuration`] and is fatal — a
//! scorer never runs with a half-valid config.

use crate::error::{CoreError, CoreResult};

// ── LogVerbosity ──────────────────────────────────────────────────────────────

/// How chatty the scoring pipeline is on its `tracing` targets.
///
/// Ordered: `Silent < Warnings < Verbose`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogVerbosity {
    Silent,
    #[default]
    Warnings,
    Verbose,
}

// ── Section structs ───────────────────────────────────────────────────────────

/// Probability clamping and aggregation settings.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoringConfig {
    /// Lower clamp applied to every predicted open probability.
    pub min_probability: f64,
    /// Upper clamp applied to every predicted open probability.
    pub max_probability: f64,
    /// Informational threshold below which a log probability is considered
    /// negligible.  Not enforced.
    pub log_threshold: f64,
    /// Aggregation must run in the log domain; `false` is rejected.
    pub use_log_domain: bool,
    /// Bounds applied to final linear probabilities.
    pub clamp_bounds: (f64, f64),
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_probability: 1e-6,
            max_probability: 1.0 - 1e-6,
            log_threshold: -30.0,
            use_log_domain: true,
            clamp_bounds: (0.0, 1.0),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> CoreResult<()> {
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        if !unit(self.min_probability) || !unit(self.max_probability) {
            return Err(CoreError::Configuration(
                "min_probability and max_probability must lie in [0, 1]".into(),
            ));
        }
        if self.min_probability > self.max_probability {
            return Err(CoreError::Configuration(format!(
                "min_probability {} exceeds max_probability {}",
                self.min_probability, self.max_probability
            )));
        }
        if !self.use_log_domain {
            return Err(CoreError::Configuration(
                "linear-domain aggregation is not supported; set use_log_domain".into(),
            ));
        }
        let (lo, hi) = self.clamp_bounds;
        if !unit(lo) || !unit(hi) || lo > hi {
            return Err(CoreError::Configuration(format!(
                "clamp_bounds ({lo}, {hi}) must be an ordered pair in [0, 1]"
            )));
        }
        Ok(())
    }
}

/// Soft time budgets, caching, and log verbosity.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceConfig {
    /// Soft budget for one enumeration call, seconds.  Exceeding it emits a
    /// warning; it is never enforced as a deadline.
    pub max_enumeration_time_secs: f64,
    /// Soft budget for one scoring call, seconds.  Telemetry only.
    pub max_scoring_time_secs: f64,
    /// Enables the enumeration memoization cache.
    pub enable_caching: bool,
    pub log_verbosity: LogVerbosity,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_enumeration_time_secs: 5.0,
            max_scoring_time_secs: 2.0,
            enable_caching: true,
            log_verbosity: LogVerbosity::Warnings,
        }
    }
}

impl PerformanceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        for (name, v) in [
            ("max_enumeration_time_secs", self.max_enumeration_time_secs),
            ("max_scoring_time_secs", self.max_scoring_time_secs),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CoreError::Configuration(format!(
                    "{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Predictor interaction settings.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PredictionConfig {
    /// Default open probability hosts hand to their predictor
    /// implementations.  The scoring pipeline itself consults
    /// `BridgePredictor::default_probability` for policy-rejected and
    /// unsupported bridges; predictors built from this config should return
    /// this value there.
    pub default_bridge_probability: f64,
    /// Issue one batch call per route instead of per-bridge calls.
    pub use_batch_prediction: bool,
    /// Upper bound on inputs per batch call (further capped by the
    /// predictor's own `max_batch_size`).
    pub batch_size: usize,
    /// Beta-prior pseudo-counts for historical smoothing.
    pub prior_alpha: f64,
    pub prior_beta: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            default_bridge_probability: 0.5,
            use_batch_prediction: true,
            batch_size: 32,
            prior_alpha: 1.0,
            prior_beta: 1.0,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.default_bridge_probability) {
            return Err(CoreError::Configuration(format!(
                "default_bridge_probability {} must lie in [0, 1]",
                self.default_bridge_probability
            )));
        }
        if self.batch_size == 0 {
            return Err(CoreError::Configuration("batch_size must be at least 1".into()));
        }
        for (name, v) in [("prior_alpha", self.prior_alpha), ("prior_beta", self.prior_beta)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CoreError::Configuration(format!(
                    "{name} must be finite and positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Top-level engine configuration.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub performance: PerformanceConfig,
    pub prediction: PredictionConfig,
    /// Global salt mixed into every feature seed.  Callers that also run the
    /// path enumerator should pass the same value as its `random_seed` so a
    /// journey is one deterministic unit.
    pub random_seed: u64,
}

impl EngineConfig {
    /// Validate every section.  Any violation is fatal at construction.
    pub fn validate(&self) -> CoreResult<()> {
        self.scoring.validate()?;
        self.performance.validate()?;
        self.prediction.validate()?;
        Ok(())
    }
}
