//! Unit tests for span-score.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use span_core::{
        BridgePolicy, Clock, EngineConfig, FixedClock, StaticBridgePolicy, Timestamp,
    };
    use span_graph::{Edge, Graph, GraphBuilder, Node, RoutePath};
    use span_predict::{
        BatchPredictionResult, BridgePredictor, PredictError, PredictResult, PredictionInput,
        PredictionResult, validate_batch,
    };

    use crate::scorer::PathScorer;

    /// 2026-08-01 00:00:00 UTC (a Saturday).
    pub const DEPARTURE: Timestamp = Timestamp(1_785_542_400.0);

    pub fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::at(DEPARTURE))
    }

    pub fn policy() -> Arc<dyn BridgePolicy> {
        Arc::new(StaticBridgePolicy::new(
            ["bridge1", "bridge2", "bridge3"],
            ["test_bridge"],
        ))
    }

    pub fn scorer(predictor: Arc<dyn BridgePredictor>) -> PathScorer {
        PathScorer::new(EngineConfig::default(), predictor, policy(), clock()).unwrap()
    }

    pub fn scorer_with(
        config: EngineConfig,
        predictor: Arc<dyn BridgePredictor>,
    ) -> PathScorer {
        PathScorer::new(config, predictor, policy(), clock()).unwrap()
    }

    pub fn scorer_checked(config: EngineConfig) -> Result<PathScorer, crate::error::ScoreError> {
        PathScorer::new(config, CountingPredictor::constant(0.5), policy(), clock())
    }

    // ── Mock predictors ───────────────────────────────────────────────────

    /// Fixed-probability predictor with call counters.
    pub struct CountingPredictor {
        pub p: f64,
        pub default_p: f64,
        pub supported: bool,
        pub max_batch: usize,
        pub batch_calls: AtomicUsize,
        pub single_calls: AtomicUsize,
    }

    impl CountingPredictor {
        pub fn constant(p: f64) -> Arc<Self> {
            Arc::new(Self {
                p,
                default_p: 0.5,
                supported: true,
                max_batch: 64,
                batch_calls: AtomicUsize::new(0),
                single_calls: AtomicUsize::new(0),
            })
        }

        pub fn batches(&self) -> usize {
            self.batch_calls.load(Ordering::Relaxed)
        }

        pub fn singles(&self) -> usize {
            self.single_calls.load(Ordering::Relaxed)
        }

        pub fn calls(&self) -> usize {
            self.batches() + self.singles()
        }
    }

    impl BridgePredictor for CountingPredictor {
        fn predict(
            &self,
            bridge_id: &str,
            eta: Timestamp,
            _features: &[f64],
        ) -> PredictResult<PredictionResult> {
            self.single_calls.fetch_add(1, Ordering::Relaxed);
            Ok(PredictionResult::new(bridge_id, eta, self.p, None))
        }

        fn predict_batch(
            &self,
            inputs: &[PredictionInput],
        ) -> PredictResult<BatchPredictionResult> {
            self.batch_calls.fetch_add(1, Ordering::Relaxed);
            validate_batch(inputs, self.max_batch_size())?;
            Ok(BatchPredictionResult {
                results: inputs
                    .iter()
                    .map(|i| PredictionResult::new(&i.bridge_id, i.eta, self.p, None))
                    .collect(),
                processing_time_secs: 0.0,
                batch_size: inputs.len(),
            })
        }

        fn default_probability(&self) -> f64 {
            self.default_p
        }

        fn supports(&self, _bridge_id: &str) -> bool {
            self.supported
        }

        fn max_batch_size(&self) -> usize {
            self.max_batch
        }
    }

    /// Fails any batch containing the poisoned bridge id.
    pub struct FailFor {
        pub bad: String,
        pub p: f64,
    }

    impl BridgePredictor for FailFor {
        fn predict_batch(
            &self,
            inputs: &[PredictionInput],
        ) -> PredictResult<BatchPredictionResult> {
            if inputs.iter().any(|i| i.bridge_id == self.bad) {
                return Err(PredictError::Failed(format!("{} is offline", self.bad)));
            }
            Ok(BatchPredictionResult {
                results: inputs
                    .iter()
                    .map(|i| PredictionResult::new(&i.bridge_id, i.eta, self.p, None))
                    .collect(),
                processing_time_secs: 0.0,
                batch_size: inputs.len(),
            })
        }

        fn supports(&self, _bridge_id: &str) -> bool {
            true
        }
    }

    /// Breaks the result-count contract.
    pub struct BadCount;

    impl BridgePredictor for BadCount {
        fn predict_batch(
            &self,
            inputs: &[PredictionInput],
        ) -> PredictResult<BatchPredictionResult> {
            Ok(BatchPredictionResult {
                results: Vec::new(),
                processing_time_secs: 0.0,
                batch_size: inputs.len(),
            })
        }

        fn supports(&self, _bridge_id: &str) -> bool {
            true
        }
    }

    // ── Fixtures ──────────────────────────────────────────────────────────

    fn node(id: &str) -> Node {
        Node::new(id, format!("{id} street"), 47.6, -122.3)
    }

    /// Two parallel routes `a → … → c`, one bridge per leg (500 s and 550 s).
    pub fn parallel_graph() -> Graph {
        let mut b = GraphBuilder::new();
        for n in ["a", "b", "c", "d"] {
            b.add_node(node(n));
        }
        b.add_edge(Edge::bridge("a", "b", 300.0, 1_500.0, "bridge1"));
        b.add_edge(Edge::new("b", "c", 200.0, 1_000.0));
        b.add_edge(Edge::bridge("a", "d", 400.0, 2_000.0, "bridge2"));
        b.add_edge(Edge::new("d", "c", 150.0, 800.0));
        b.build(None).unwrap()
    }

    /// `a →(300, bridge_id) b →(200) c`.
    pub fn bridge_route(bridge_id: &str) -> RoutePath {
        RoutePath::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                Edge::bridge("a", "b", 300.0, 1_500.0, bridge_id),
                Edge::new("b", "c", 200.0, 1_000.0),
            ],
        )
        .unwrap()
    }

    /// `a → e → d` with no bridges.
    pub fn plain_route() -> RoutePath {
        RoutePath::new(
            vec!["a".into(), "e".into(), "d".into()],
            vec![
                Edge::new("a", "e", 120.0, 600.0),
                Edge::new("e", "d", 90.0, 400.0),
            ],
        )
        .unwrap()
    }

    /// Chain crossing `bridge1`, `bridge2`, `bridge3` in order.
    pub fn three_bridge_route() -> RoutePath {
        RoutePath::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![
                Edge::bridge("a", "b", 100.0, 500.0, "bridge1"),
                Edge::bridge("b", "c", 100.0, 500.0, "bridge2"),
                Edge::bridge("c", "d", 100.0, 500.0, "bridge3"),
            ],
        )
        .unwrap()
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod aggregate {
    use proptest::prelude::*;

    use crate::aggregate::{aggregate_log_domain, network_probability};

    #[test]
    fn empty_is_certainty() {
        assert_eq!(aggregate_log_domain(&[]), (0.0, 1.0));
    }

    #[test]
    fn single_probability_passes_through() {
        let (log, linear) = aggregate_log_domain(&[0.8]);
        assert!((linear - 0.8).abs() < 1e-15);
        assert!((log - 0.8f64.ln()).abs() < 1e-15);
    }

    #[test]
    fn network_empty_is_zero() {
        assert_eq!(network_probability(&[]), 0.0);
    }

    #[test]
    fn network_single_equals_route() {
        assert!((network_probability(&[0.8]) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn network_two_routes() {
        // 1 − 0.2 × 0.2
        assert!((network_probability(&[0.8, 0.8]) - 0.96).abs() < 1e-12);
    }

    #[test]
    fn network_certain_route_dominates() {
        assert_eq!(network_probability(&[1.0, 0.1]), 1.0);
    }

    #[test]
    fn network_stable_for_tiny_probabilities() {
        let p = network_probability(&[1e-12, 1e-12]);
        assert!((p - 2e-12).abs() < 1e-15);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn power_law(p in 1e-6f64..=0.999_999, n in 1usize..=32) {
            let (_, linear) = aggregate_log_domain(&vec![p; n]);
            let expected = p.powi(n as i32);
            prop_assert!((linear - expected).abs() <= expected * 1e-12);
        }

        #[test]
        fn log_and_linear_agree(probs in proptest::collection::vec(1e-6f64..=0.999_999, 0..16)) {
            let (log, linear) = aggregate_log_domain(&probs);
            prop_assert!((log.exp() - linear).abs() <= linear.abs() * 1e-12 + 1e-300);
            prop_assert!(log <= 0.0);
            prop_assert!((0.0..=1.0).contains(&linear));
        }

        #[test]
        fn network_at_least_best(probs in proptest::collection::vec(0.0f64..=1.0, 1..8)) {
            let best = probs.iter().copied().fold(0.0, f64::max);
            prop_assert!(network_probability(&probs) >= best - 1e-12);
        }
    }
}

// ── Features ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod features {
    use std::sync::Arc;

    use span_core::{FixedClock, Timestamp};

    use crate::features::{FEATURE_LEN, FeatureBuilder};

    fn builder(seed: u64) -> FeatureBuilder {
        FeatureBuilder::new(Arc::new(FixedClock::at(Timestamp(0.0))), seed)
    }

    #[test]
    fn deterministic() {
        let b = builder(7);
        let eta = Timestamp(10_000.0);
        assert_eq!(b.build("bridge1", eta), b.build("bridge1", eta));
    }

    #[test]
    fn sensitive_to_bridge_bucket_and_seed() {
        let b = builder(7);
        let eta = Timestamp(10_000.0);
        let base = b.build("bridge1", eta);
        assert_ne!(&base[4..], &b.build("bridge2", eta)[4..]);
        // 10 minutes later lands in a different 5-minute bucket.
        assert_ne!(&base[4..], &b.build("bridge1", eta.offset_secs(600.0))[4..]);
        assert_ne!(&base[4..], &builder(8).build("bridge1", eta)[4..]);
    }

    #[test]
    fn same_bucket_same_stream() {
        let b = builder(7);
        // 12:00:00 and 12:04:59 share a bucket; cyclic features differ.
        let a = b.build("bridge1", Timestamp(12.0 * 3_600.0));
        let c = b.build("bridge1", Timestamp(12.0 * 3_600.0 + 299.0));
        assert_eq!(&a[4..], &c[4..]);
        assert_ne!(a[0], c[0]);
    }

    #[test]
    fn cyclic_encodings() {
        let b = builder(0);
        // 06:00 → minute 360 of 1440 → quarter turn.
        let f = b.build("bridge1", Timestamp(6.0 * 3_600.0));
        assert!((f[0] - 1.0).abs() < 1e-12);
        assert!(f[1].abs() < 1e-12);
        // Epoch day is a Thursday → weekday 3 of 7.
        let angle = std::f64::consts::TAU * 3.0 / 7.0;
        assert!((f[2] - angle.sin()).abs() < 1e-12);
        assert!((f[3] - angle.cos()).abs() < 1e-12);
    }

    #[test]
    fn values_in_documented_ranges() {
        let b = builder(3);
        for hour in [3.0, 7.0, 12.0, 17.0, 20.0] {
            let f = b.build("bridge1", Timestamp(hour * 3_600.0));
            assert_eq!(f.len(), FEATURE_LEN);
            assert!(f.iter().all(|v| v.is_finite()));
            for i in [4, 5, 7, 10, 11] {
                assert!((0.0..1.0).contains(&f[i]), "feature {i} = {}", f[i]);
            }
            assert!((0.0..900.0).contains(&f[6]));
            assert!(f[8] == 0.0 || f[8] == 1.0);
            assert!((0.0..300.0).contains(&f[9]));
            assert!((30.0..60.0).contains(&f[13]));
        }
    }

    #[test]
    fn congestion_slows_current_speed() {
        let b = builder(3);
        // 07:00 is morning rush: current = free-flow / 1.3.
        let f = b.build("bridge1", Timestamp(7.0 * 3_600.0));
        assert!((f[12] - f[13] / 1.3).abs() < 1e-12);
        // 20:00 is the plain evening regime: no slowdown.
        let g = b.build("bridge1", Timestamp(20.0 * 3_600.0));
        assert!((g[12] - g[13]).abs() < 1e-12);
    }
}

// ── Feature cache ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use proptest::prelude::*;

    use crate::cache::{FeatureCache, FeatureKey};
    use crate::features::FEATURE_LEN;

    fn key(n: u32) -> FeatureKey {
        FeatureKey::new(format!("bridge_{n}"), n)
    }

    fn vector(n: u32) -> [f64; FEATURE_LEN] {
        [n as f64; FEATURE_LEN]
    }

    #[test]
    fn fifo_eviction_keeps_newest() {
        let cache = FeatureCache::new(3);
        for n in 0..5 {
            cache.insert(key(n), vector(n));
        }
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.keys_in_order(), vec![key(2), key(3), key(4)]);
        assert!(cache.get(&key(0)).is_none());
        assert_eq!(cache.get(&key(4)), Some(vector(4)));
    }

    #[test]
    fn reinsert_moves_to_tail_without_growth() {
        let cache = FeatureCache::new(3);
        for n in 0..3 {
            cache.insert(key(n), vector(n));
        }
        cache.insert(key(0), vector(9));
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.keys_in_order(), vec![key(1), key(2), key(0)]);
        assert_eq!(cache.get(&key(0)), Some(vector(9)));

        // Key 0 now survives the next eviction; key 1 is the oldest.
        cache.insert(key(5), vector(5));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(0)).is_some());
    }

    #[test]
    fn counters_monotone() {
        let cache = FeatureCache::new(2);
        assert!(cache.get(&key(0)).is_none());
        cache.insert(key(0), vector(0));
        assert!(cache.get(&key(0)).is_some());
        assert!(cache.get(&key(0)).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
        assert_eq!(stats.capacity, 2);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let cache = FeatureCache::new(0);
        cache.insert(key(0), vector(0));
        cache.insert(key(1), vector(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(1)).is_some());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Distinct-key insertions leave the last `min(k, C)` keys, in order.
        #[test]
        fn holds_last_capacity_keys(k in 1u32..40, capacity in 1usize..12) {
            let cache = FeatureCache::new(capacity);
            for n in 0..k {
                cache.insert(key(n), vector(n));
            }
            let kept = capacity.min(k as usize);
            let expected: Vec<_> = (k - kept as u32..k).map(key).collect();
            prop_assert_eq!(cache.keys_in_order(), expected);
            prop_assert_eq!(cache.len(), kept);
        }
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod metrics {
    use std::io::{Read, Seek};

    use crate::metrics::ScoringMetrics;

    #[test]
    fn welford_mean_and_std_dev() {
        let m = ScoringMetrics::new();
        for secs in [1.0, 2.0, 3.0] {
            m.record("score_path", secs);
        }
        let snap = m.snapshot();
        assert_eq!(snap.operations.len(), 1);
        let op = &snap.operations[0];
        assert_eq!(op.operation, "score_path");
        assert_eq!(op.count, 3);
        assert!((op.mean_secs - 2.0).abs() < 1e-12);
        assert!((op.std_dev_secs - 1.0).abs() < 1e-12);
        assert_eq!(op.min_secs, 1.0);
        assert_eq!(op.max_secs, 3.0);
        assert!((op.rolling_mean_secs - 2.0).abs() < 1e-12);
    }

    #[test]
    fn single_observation_has_zero_std_dev() {
        let m = ScoringMetrics::new();
        m.record("enumerate", 0.5);
        assert_eq!(m.snapshot().operations[0].std_dev_secs, 0.0);
    }

    #[test]
    fn counters() {
        let m = ScoringMetrics::new();
        m.incr("paths_scored");
        m.add("paths_scored", 2);
        m.incr("bridges_predicted");
        assert_eq!(m.counter("paths_scored"), 3);
        assert_eq!(m.counter("bridges_predicted"), 1);
        assert_eq!(m.counter("never_written"), 0);
    }

    #[test]
    fn operations_sorted_by_name() {
        let m = ScoringMetrics::new();
        m.record("z_op", 1.0);
        m.record("a_op", 1.0);
        let names: Vec<_> = m
            .snapshot()
            .operations
            .iter()
            .map(|o| o.operation.clone())
            .collect();
        assert_eq!(names, vec!["a_op", "z_op"]);
    }

    #[test]
    fn csv_export() {
        let m = ScoringMetrics::new();
        m.record("score_path", 0.25);
        m.record("score_path", 0.75);

        let mut buf = Vec::new();
        m.export_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "operation,count,mean_secs,std_dev_secs,min_secs,max_secs,rolling_mean_secs"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("score_path,2,0.5,"));
    }

    #[test]
    fn csv_export_to_file() {
        let m = ScoringMetrics::new();
        m.record("score_paths", 1.5);

        let mut file = tempfile::tempfile().unwrap();
        m.export_csv(&mut file).unwrap();
        file.rewind().unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        assert!(text.contains("score_paths,1,1.5,"));
    }
}

// ── Scorer scenarios ──────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use span_core::{EngineConfig, NodeId};
    use span_paths::{EnumMode, PathEnumConfig, PathEnumerator};

    use super::helpers::{
        BadCount, CountingPredictor, DEPARTURE, FailFor, bridge_route, parallel_graph,
        plain_route, scorer, scorer_with, three_bridge_route,
    };
    use crate::error::ScoreError;

    /// Two parallel routes, constant 0.8 predictor: route probabilities 0.8
    /// each, network 0.96.
    #[test]
    fn two_parallel_paths_end_to_end() {
        let graph = parallel_graph();
        let enumerator = PathEnumerator::new(PathEnumConfig {
            mode: EnumMode::Dfs,
            max_paths: 10,
            ..PathEnumConfig::default()
        })
        .unwrap();
        let routes = enumerator
            .enumerate(&graph, &NodeId::new("a"), &NodeId::new("c"))
            .unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].total_travel_time(), 500.0);
        assert_eq!(routes[1].total_travel_time(), 550.0);

        let predictor = CountingPredictor::constant(0.8);
        let s = scorer(predictor);
        let analysis = s
            .analyze_journey(&routes, &NodeId::new("a"), &NodeId::new("c"), DEPARTURE)
            .unwrap();

        assert_eq!(analysis.path_scores.len(), 2);
        for score in &analysis.path_scores {
            assert!((score.linear_probability - 0.8).abs() < 1e-12);
        }
        assert!((analysis.network_probability - 0.96).abs() < 1e-12);
        assert!((analysis.best_path_probability - 0.8).abs() < 1e-12);
        assert_eq!(analysis.total_paths_analyzed, 2);
    }

    /// A bridge-free route is certain and never consults the predictor.
    #[test]
    fn no_bridge_route_is_certain() {
        let predictor = CountingPredictor::constant(0.1);
        let s = scorer(predictor.clone());
        let score = s.score_path(&plain_route(), DEPARTURE).unwrap();

        assert_eq!(score.linear_probability, 1.0);
        assert_eq!(score.log_probability, 0.0);
        assert!(score.bridge_probabilities.is_empty());
        assert_eq!(predictor.calls(), 0);
    }

    /// A policy-rejected bridge takes the default probability without a
    /// prediction call.
    #[test]
    fn policy_rejected_bridge_uses_default() {
        let predictor = CountingPredictor::constant(0.9);
        let s = scorer(predictor.clone());
        let score = s.score_path(&bridge_route("unknown_999"), DEPARTURE).unwrap();

        assert_eq!(score.bridge_probabilities["unknown_999"], 0.5);
        assert!((score.linear_probability - 0.5).abs() < 1e-12);
        assert_eq!(predictor.calls(), 0);
    }

    /// Synthetic ids are accepted and predicted normally.
    #[test]
    fn synthetic_bridge_is_predicted() {
        let predictor = CountingPredictor::constant(0.7);
        let s = scorer(predictor.clone());
        let score = s.score_path(&bridge_route("test_bridge"), DEPARTURE).unwrap();
        assert!((score.linear_probability - 0.7).abs() < 1e-12);
        assert_eq!(predictor.batches(), 1);
    }

    /// Declined bridges degrade to the default probability and are listed.
    #[test]
    fn unsupported_bridge_degrades() {
        let mut predictor = CountingPredictor::constant(0.9);
        Arc::get_mut(&mut predictor).unwrap().supported = false;
        let s = scorer(predictor);
        let score = s.score_path(&bridge_route("bridge1"), DEPARTURE).unwrap();

        assert_eq!(score.unsupported_bridges, vec!["bridge1"]);
        assert!((score.linear_probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn probabilities_clamped_into_band() {
        let mut config = EngineConfig::default();
        config.scoring.min_probability = 0.05;
        config.scoring.max_probability = 0.95;

        let s = scorer_with(config, CountingPredictor::constant(1.0));
        let score = s.score_path(&bridge_route("bridge1"), DEPARTURE).unwrap();
        assert!((score.bridge_probabilities["bridge1"] - 0.95).abs() < 1e-12);

        let s = scorer_with(config, CountingPredictor::constant(0.0));
        let score = s.score_path(&bridge_route("bridge1"), DEPARTURE).unwrap();
        assert!((score.bridge_probabilities["bridge1"] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn batch_calls_are_chunked() {
        let mut predictor = CountingPredictor::constant(0.8);
        Arc::get_mut(&mut predictor).unwrap().max_batch = 2;
        let s = scorer(predictor.clone());
        s.score_path(&three_bridge_route(), DEPARTURE).unwrap();
        // Three bridges with a limit of two per call → two batches.
        assert_eq!(predictor.batches(), 2);
        assert_eq!(predictor.singles(), 0);
    }

    #[test]
    fn single_prediction_mode() {
        let mut config = EngineConfig::default();
        config.prediction.use_batch_prediction = false;
        let predictor = CountingPredictor::constant(0.8);
        let s = scorer_with(config, predictor.clone());
        s.score_path(&three_bridge_route(), DEPARTURE).unwrap();
        assert_eq!(predictor.singles(), 3);
        assert_eq!(predictor.batches(), 0);
    }

    #[test]
    fn three_bridges_multiply() {
        let s = scorer(CountingPredictor::constant(0.8));
        let score = s.score_path(&three_bridge_route(), DEPARTURE).unwrap();
        assert!((score.linear_probability - 0.8f64.powi(3)).abs() < 1e-12);
        assert!(score.log_probability <= 0.0);
        assert_eq!(score.bridge_probabilities.len(), 3);
    }

    #[test]
    fn result_count_mismatch_fails() {
        let s = scorer(Arc::new(BadCount));
        let r = s.score_path(&bridge_route("bridge1"), DEPARTURE);
        assert!(matches!(r, Err(ScoreError::PredictionFailed(_))));
    }

    #[test]
    fn batch_records_per_route_failures() {
        let s = scorer(Arc::new(FailFor {
            bad: "bridge2".into(),
            p: 0.8,
        }));
        let routes = [bridge_route("bridge1"), bridge_route("bridge2")];
        let batch = s.score_paths(&routes, DEPARTURE).unwrap();

        assert_eq!(batch.scores.len(), 1);
        assert_eq!(batch.failures.len(), 1);
        let (index, error) = &batch.failures[0];
        assert_eq!(*index, 1);
        assert!(matches!(error, ScoreError::PredictionFailed(_)));
    }

    #[test]
    fn batch_with_all_failures_errors() {
        let s = scorer(Arc::new(FailFor {
            bad: "bridge1".into(),
            p: 0.8,
        }));
        let routes = [bridge_route("bridge1")];
        assert!(matches!(
            s.score_paths(&routes, DEPARTURE),
            Err(ScoreError::PredictionFailed(_))
        ));
    }

    #[test]
    fn empty_batch_rejected() {
        let s = scorer(CountingPredictor::constant(0.8));
        assert!(matches!(
            s.score_paths(&[], DEPARTURE),
            Err(ScoreError::EmptyPathSet(_))
        ));
    }

    #[test]
    fn cancellation_is_observed() {
        let s = scorer(CountingPredictor::constant(0.8));
        let cancel = AtomicBool::new(true);
        let routes = [bridge_route("bridge1")];
        assert!(matches!(
            s.score_paths_cancellable(&routes, DEPARTURE, &cancel),
            Err(ScoreError::Cancelled)
        ));
        assert_eq!(s.metrics().counter("paths_scored"), 0);
    }

    #[test]
    fn invalid_config_fails_construction() {
        let mut config = EngineConfig::default();
        config.scoring.min_probability = 2.0;
        let r = super::helpers::scorer_checked(config);
        assert!(matches!(r, Err(ScoreError::Configuration(_))));
    }

    #[test]
    fn scoring_updates_metrics() {
        let s = scorer(CountingPredictor::constant(0.8));
        s.score_path(&three_bridge_route(), DEPARTURE).unwrap();
        assert_eq!(s.metrics().counter("paths_scored"), 1);
        assert_eq!(s.metrics().counter("bridges_predicted"), 3);
        let snap = s.metrics().snapshot();
        assert!(snap.operations.iter().any(|o| o.operation == "score_path"));
    }
}

// ── Determinism & cache interplay ─────────────────────────────────────────────

#[cfg(test)]
mod determinism {
    use super::helpers::{CountingPredictor, DEPARTURE, scorer, three_bridge_route};

    #[test]
    fn repeated_scoring_is_identical_and_cached() {
        let s = scorer(CountingPredictor::constant(0.8));
        let route = three_bridge_route();

        let first = s.score_path(&route, DEPARTURE).unwrap();
        let after_first = s.cache_stats();
        assert_eq!(after_first.misses, 3);
        assert_eq!(after_first.hits, 0);
        assert_eq!(after_first.len, 3);

        let second = s.score_path(&route, DEPARTURE).unwrap();
        let after_second = s.cache_stats();
        assert_eq!(after_second.hits, 3);
        assert_eq!(after_second.misses, 3);

        assert_eq!(first.log_probability, second.log_probability);
        assert_eq!(first.linear_probability, second.linear_probability);
        assert_eq!(first.bridge_probabilities, second.bridge_probabilities);
    }

    #[test]
    fn batch_scoring_is_deterministic() {
        let routes = [three_bridge_route()];
        let a = scorer(CountingPredictor::constant(0.37));
        let b = scorer(CountingPredictor::constant(0.37));
        let x = a.score_paths(&routes, DEPARTURE).unwrap();
        let y = b.score_paths(&routes, DEPARTURE).unwrap();
        assert_eq!(x.scores.len(), y.scores.len());
        assert_eq!(
            x.scores[0].linear_probability,
            y.scores[0].linear_probability
        );
    }
}

// ── Score invariants ──────────────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use proptest::prelude::*;

    use super::helpers::{CountingPredictor, DEPARTURE, scorer, three_bridge_route};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn scores_stay_in_range(p in 0.0f64..=1.0) {
            let s = scorer(CountingPredictor::constant(p));
            let score = s.score_path(&three_bridge_route(), DEPARTURE).unwrap();
            prop_assert!((0.0..=1.0).contains(&score.linear_probability));
            prop_assert!(score.log_probability <= 0.0);
            prop_assert!(
                (score.log_probability.exp() - score.linear_probability).abs()
                    <= score.linear_probability * 1e-12 + 1e-300
            );
        }
    }
}

// ── Journey analysis ──────────────────────────────────────────────────────────

#[cfg(test)]
mod journey {
    use std::sync::Arc;

    use span_core::NodeId;

    use super::helpers::{CountingPredictor, DEPARTURE, FailFor, bridge_route, scorer};
    use crate::error::ScoreError;

    #[test]
    fn network_dominates_best() {
        let s = scorer(CountingPredictor::constant(0.6));
        let routes = [bridge_route("bridge1"), bridge_route("bridge2")];
        let analysis = s
            .analyze_journey(&routes, &NodeId::new("a"), &NodeId::new("c"), DEPARTURE)
            .unwrap();
        assert!(analysis.network_probability >= analysis.best_path_probability);
    }

    #[test]
    fn counts_failed_routes_in_total() {
        let s = scorer(Arc::new(FailFor {
            bad: "bridge2".into(),
            p: 0.8,
        }));
        let routes = [bridge_route("bridge1"), bridge_route("bridge2")];
        let analysis = s
            .analyze_journey(&routes, &NodeId::new("a"), &NodeId::new("c"), DEPARTURE)
            .unwrap();
        assert_eq!(analysis.path_scores.len(), 1);
        assert_eq!(analysis.total_paths_analyzed, 2);
    }

    #[test]
    fn empty_endpoint_rejected() {
        let s = scorer(CountingPredictor::constant(0.8));
        let routes = [bridge_route("bridge1")];
        let r = s.analyze_journey(&routes, &NodeId::new(""), &NodeId::new("c"), DEPARTURE);
        assert!(matches!(r, Err(ScoreError::InvalidPath(_))));
    }
}
