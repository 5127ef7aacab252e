//! The path scorer.
//!
//! # Pipeline (one route)
//!
//! 1. Contiguity check (defensive — routes validate at construction).
//! 2. Bridge ETAs from the propagator.  A bridge-free route scores 1.
//! 3. Partition bridge ids through the policy: accepted ids go to the
//!    predictor; policy-rejected ids take the predictor's default
//!    probability without a prediction call.
//! 4. Feature vectors per accepted bridge, through the bounded cache.
//! 5. One batch prediction (chunked by the configured batch size and the
//!    predictor's own limit), or per-bridge calls when batching is off.
//! 6. Clamp each returned probability into the configured band; bridges the
//!    predictor declines take the default probability instead.
//! 7. Log-domain aggregation; non-finite or out-of-range results are
//!    numerical errors.
//!
//! # Ownership
//!
//! A `PathScorer` owns its feature cache and metrics; the predictor,
//! policy, and clock are shared handles.  The scorer itself is `Send +
//! Sync` and can be shared across worker threads.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, warn};

use span_core::{BridgePolicy, Clock, EngineConfig, LogVerbosity, Timestamp};
use span_eta::EtaPropagator;
use span_graph::RoutePath;
use span_predict::{BridgePredictor, PredictionInput, PredictionResult};

use crate::aggregate::aggregate_log_domain;
use crate::cache::{FeatureCache, FeatureCacheStats, FeatureKey};
use crate::error::{ScoreError, ScoreResult};
use crate::features::{FEATURE_LEN, FeatureBuilder};
use crate::metrics::ScoringMetrics;

// ── Score types ───────────────────────────────────────────────────────────────

/// Traversability score for one route.
#[derive(Clone, Debug)]
pub struct PathScore {
    pub path: RoutePath,
    /// `Σ ln pᵢ`; always ≤ 0.
    pub log_probability: f64,
    /// `exp(log_probability)`, clamped into the configured output bounds.
    pub linear_probability: f64,
    /// Per-bridge open probability, keyed by bridge id.
    pub bridge_probabilities: BTreeMap<String, f64>,
    /// Accepted bridges the predictor declined; they carry the default
    /// probability in the map above.
    pub unsupported_bridges: Vec<String>,
}

impl PathScore {
    /// Score for a route with no bridges: certainty.
    fn certain(path: RoutePath) -> Self {
        Self {
            path,
            log_probability: 0.0,
            linear_probability: 1.0,
            bridge_probabilities: BTreeMap::new(),
            unsupported_bridges: Vec::new(),
        }
    }
}

/// Outcome of scoring a batch of routes.
#[derive(Debug, Default)]
pub struct BatchScore {
    /// Successful scores, in input order.
    pub scores: Vec<PathScore>,
    /// Per-route failures as `(input index, error)`.
    pub failures: Vec<(usize, ScoreError)>,
}

// ── PathScorer ────────────────────────────────────────────────────────────────

/// Scores routes against a bridge-opening predictor.
pub struct PathScorer {
    config: EngineConfig,
    predictor: Arc<dyn BridgePredictor>,
    policy: Arc<dyn BridgePolicy>,
    propagator: EtaPropagator,
    features: FeatureBuilder,
    cache: FeatureCache,
    metrics: ScoringMetrics,
}

impl PathScorer {
    /// Build a scorer.  Fails with [`ScoreError::Configuration`] on any
    /// invalid tunable.
    pub fn new(
        config: EngineConfig,
        predictor: Arc<dyn BridgePredictor>,
        policy: Arc<dyn BridgePolicy>,
        clock: Arc<dyn Clock>,
    ) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self {
            propagator: EtaPropagator::new(Arc::clone(&clock)),
            features: FeatureBuilder::new(clock, config.random_seed),
            cache: FeatureCache::default(),
            metrics: ScoringMetrics::new(),
            config,
            predictor,
            policy,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ScoringMetrics {
        &self.metrics
    }

    pub fn cache_stats(&self) -> FeatureCacheStats {
        self.cache.stats()
    }

    // ── Single route ──────────────────────────────────────────────────────

    /// Score one route departing at `departure`.
    pub fn score_path(&self, route: &RoutePath, departure: Timestamp) -> ScoreResult<PathScore> {
        let started = Instant::now();
        let score = self.score_path_inner(route, departure)?;
        self.finish_op("score_path", started);
        Ok(score)
    }

    fn score_path_inner(&self, route: &RoutePath, departure: Timestamp) -> ScoreResult<PathScore> {
        if !route.is_contiguous() {
            return Err(ScoreError::InvalidPath(format!(
                "route {} -> {} failed contiguity check",
                route.start(),
                route.end()
            )));
        }

        let bridge_etas = self.propagator.bridge_etas(route, departure);
        if bridge_etas.is_empty() {
            self.metrics.incr("paths_scored");
            return Ok(PathScore::certain(route.clone()));
        }

        // Partition: accepted ids reach the predictor, rejected ids take the
        // default probability directly.
        let mut accepted: Vec<(String, Timestamp)> = Vec::with_capacity(bridge_etas.len());
        let mut rejected: Vec<String> = Vec::new();
        for (bridge_id, eta) in bridge_etas {
            if self.policy.is_accepted_bridge_id(&bridge_id, true) {
                accepted.push((bridge_id, eta.arrival_time));
            } else {
                if self.config.performance.log_verbosity >= LogVerbosity::Warnings {
                    warn!(
                        bridge_id = %bridge_id,
                        "bridge id rejected by policy; using default probability"
                    );
                }
                rejected.push(bridge_id);
            }
        }

        let mut inputs = Vec::with_capacity(accepted.len());
        for (bridge_id, eta) in &accepted {
            inputs.push(PredictionInput {
                bridge_id: bridge_id.clone(),
                eta: *eta,
                features: self.features_for(bridge_id, *eta)?.to_vec(),
            });
        }

        let results = self.predict(&inputs)?;
        if results.len() != accepted.len() {
            return Err(ScoreError::PredictionFailed(format!(
                "predictor returned {} results for {} inputs",
                results.len(),
                accepted.len()
            )));
        }

        let (min_p, max_p) = (
            self.config.scoring.min_probability,
            self.config.scoring.max_probability,
        );
        let mut bridge_probabilities = BTreeMap::new();
        let mut unsupported_bridges = Vec::new();
        let mut probabilities = Vec::with_capacity(accepted.len() + rejected.len());

        for ((bridge_id, _), result) in accepted.iter().zip(&results) {
            let p = if self.predictor.supports(bridge_id) {
                if !result.open_probability.is_finite() {
                    return Err(ScoreError::PredictionFailed(format!(
                        "non-finite probability for bridge {bridge_id}"
                    )));
                }
                result.open_probability.clamp(min_p, max_p)
            } else {
                unsupported_bridges.push(bridge_id.clone());
                self.predictor.default_probability()
            };
            bridge_probabilities.insert(bridge_id.clone(), p);
            probabilities.push(p);
        }
        for bridge_id in rejected {
            let p = self.predictor.default_probability();
            bridge_probabilities.insert(bridge_id, p);
            probabilities.push(p);
        }

        let (mut log_probability, raw_linear) = aggregate_log_domain(&probabilities);
        if log_probability.is_nan() || raw_linear.is_nan() || raw_linear > 1.0 + 1e-9 {
            return Err(ScoreError::NumericalError(format!(
                "aggregation produced log {log_probability}, linear {raw_linear}"
            )));
        }

        let (lo, hi) = self.config.scoring.clamp_bounds;
        let linear_probability = raw_linear.clamp(lo, hi);
        if linear_probability != raw_linear {
            // Keep the pair consistent when the output clamp engages.
            log_probability = linear_probability.ln();
        }

        if self.config.performance.log_verbosity >= LogVerbosity::Verbose {
            debug!(
                bridges = bridge_probabilities.len(),
                log_probability, linear_probability, "scored route"
            );
        }

        self.metrics.incr("paths_scored");
        self.metrics.add("bridges_predicted", accepted.len() as u64);

        Ok(PathScore {
            path: route.clone(),
            log_probability,
            linear_probability,
            bridge_probabilities,
            unsupported_bridges,
        })
    }

    // ── Batches ───────────────────────────────────────────────────────────

    /// Score `routes` sequentially, in input order.
    ///
    /// Per-route failures are recorded in [`BatchScore::failures`] while the
    /// rest proceed; fatal errors propagate immediately.  Fails outright
    /// when the input is empty or no route scores.
    pub fn score_paths(&self, routes: &[RoutePath], departure: Timestamp) -> ScoreResult<BatchScore> {
        self.score_paths_inner(routes, departure, None)
    }

    /// [`score_paths`](Self::score_paths) with a cooperative cancel flag,
    /// observed between routes.  Cancellation returns
    /// [`ScoreError::Cancelled`] without touching caches or metrics for the
    /// remaining routes.
    pub fn score_paths_cancellable(
        &self,
        routes: &[RoutePath],
        departure: Timestamp,
        cancel: &AtomicBool,
    ) -> ScoreResult<BatchScore> {
        self.score_paths_inner(routes, departure, Some(cancel))
    }

    fn score_paths_inner(
        &self,
        routes: &[RoutePath],
        departure: Timestamp,
        cancel: Option<&AtomicBool>,
    ) -> ScoreResult<BatchScore> {
        if routes.is_empty() {
            return Err(ScoreError::EmptyPathSet("no routes to score".into()));
        }

        let started = Instant::now();
        let mut batch = BatchScore::default();
        for (index, route) in routes.iter().enumerate() {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return Err(ScoreError::Cancelled);
            }
            match self.score_path(route, departure) {
                Ok(score) => batch.scores.push(score),
                Err(e) if e.is_per_route() => {
                    if self.config.performance.log_verbosity >= LogVerbosity::Warnings {
                        warn!(index, error = %e, "route dropped from batch");
                    }
                    batch.failures.push((index, e));
                }
                Err(e) => return Err(e),
            }
        }

        if batch.scores.is_empty() {
            return Err(ScoreError::PredictionFailed(format!(
                "all {} routes failed to score",
                routes.len()
            )));
        }
        self.finish_op("score_paths", started);
        Ok(batch)
    }

    /// Rayon-parallel batch scoring, order-preserving.  Legal because
    /// predictors are `Send + Sync`; feature-cache writes stay serialized
    /// behind its lock.
    #[cfg(feature = "parallel")]
    pub fn score_paths_parallel(
        &self,
        routes: &[RoutePath],
        departure: Timestamp,
    ) -> ScoreResult<BatchScore> {
        use rayon::prelude::*;

        if routes.is_empty() {
            return Err(ScoreError::EmptyPathSet("no routes to score".into()));
        }

        let started = Instant::now();
        let results: Vec<ScoreResult<PathScore>> = routes
            .par_iter()
            .map(|route| self.score_path(route, departure))
            .collect();

        let mut batch = BatchScore::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(score) => batch.scores.push(score),
                Err(e) if e.is_per_route() => batch.failures.push((index, e)),
                Err(e) => return Err(e),
            }
        }
        if batch.scores.is_empty() {
            return Err(ScoreError::PredictionFailed(format!(
                "all {} routes failed to score",
                routes.len()
            )));
        }
        self.finish_op("score_paths", started);
        Ok(batch)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Cached feature lookup; builds and stores on miss.
    fn features_for(&self, bridge_id: &str, eta: Timestamp) -> ScoreResult<[f64; FEATURE_LEN]> {
        if bridge_id.is_empty() {
            return Err(ScoreError::FeatureGenerationFailed(
                "empty bridge id".into(),
            ));
        }
        let key = FeatureKey::new(bridge_id, self.features.bucket(eta));
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let features = self.features.build(bridge_id, eta);
        self.cache.insert(key, features);
        Ok(features)
    }

    /// Issue predictions for `inputs`, batched or one-by-one per config.
    fn predict(&self, inputs: &[PredictionInput]) -> ScoreResult<Vec<PredictionResult>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let wrap = |e: span_predict::PredictError| ScoreError::PredictionFailed(e.to_string());

        if self.config.prediction.use_batch_prediction {
            let chunk = self
                .config
                .prediction
                .batch_size
                .min(self.predictor.max_batch_size())
                .max(1);
            let mut results = Vec::with_capacity(inputs.len());
            for chunk_inputs in inputs.chunks(chunk) {
                results.extend(self.predictor.predict_batch(chunk_inputs).map_err(wrap)?.results);
            }
            Ok(results)
        } else {
            inputs
                .iter()
                .map(|i| {
                    self.predictor
                        .predict(&i.bridge_id, i.eta, &i.features)
                        .map_err(wrap)
                })
                .collect()
        }
    }

    /// Record duration telemetry and warn past the soft budget.
    fn finish_op(&self, operation: &str, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.record(operation, elapsed);
        if elapsed > self.config.performance.max_scoring_time_secs
            && self.config.performance.log_verbosity >= LogVerbosity::Warnings
        {
            warn!(
                operation,
                elapsed_secs = elapsed,
                budget_secs = self.config.performance.max_scoring_time_secs,
                "soft scoring budget exceeded"
            );
        }
    }
}
