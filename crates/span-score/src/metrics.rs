//! Scoring telemetry.
//!
//! Per-operation duration statistics (count, mean, standard deviation,
//! min/max via Welford's online algorithm, plus a bounded rolling window)
//! and named monotone counters.  Everything lives behind one mutex so
//! snapshots are consistent; recording is a short critical section on the
//! scoring path.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::Mutex;

/// Rolling-window length per operation.
const ROLLING_WINDOW: usize = 128;

// ── Per-operation statistics ──────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct OpStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    recent: VecDeque<f64>,
}

impl Default for OpStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            recent: VecDeque::with_capacity(ROLLING_WINDOW),
        }
    }
}

impl OpStats {
    fn record(&mut self, secs: f64) {
        self.count += 1;
        let delta = secs - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (secs - self.mean);
        self.min = self.min.min(secs);
        self.max = self.max.max(secs);

        if self.recent.len() == ROLLING_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(secs);
    }

    /// Sample standard deviation; 0 below two observations.
    fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }

    fn rolling_mean(&self) -> f64 {
        if self.recent.is_empty() {
            0.0
        } else {
            self.recent.iter().sum::<f64>() / self.recent.len() as f64
        }
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

/// Read-only view of one operation's statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct OpSnapshot {
    pub operation: String,
    pub count: u64,
    pub mean_secs: f64,
    pub std_dev_secs: f64,
    pub min_secs: f64,
    pub max_secs: f64,
    /// Mean over the last (up to) 128 observations.
    pub rolling_mean_secs: f64,
}

/// Consistent snapshot of all metrics.
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub operations: Vec<OpSnapshot>,
    pub counters: BTreeMap<String, u64>,
}

// ── ScoringMetrics ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
    ops: BTreeMap<String, OpStats>,
    counters: BTreeMap<String, u64>,
}

/// Thread-safe metrics aggregator owned by a scorer.
#[derive(Default)]
pub struct ScoringMetrics {
    inner: Mutex<Inner>,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `operation` taking `secs`.
    pub fn record(&self, operation: &str, secs: f64) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.ops.entry(operation.to_owned()).or_default().record(secs);
    }

    /// Increment a named counter by one.
    pub fn incr(&self, counter: &str) {
        self.add(counter, 1);
    }

    /// Increment a named counter by `n`.
    pub fn add(&self, counter: &str, n: u64) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard.counters.entry(counter.to_owned()).or_default() += n;
    }

    /// Current value of a counter (0 if never written).
    pub fn counter(&self, counter: &str) -> u64 {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.counters.get(counter).copied().unwrap_or(0)
    }

    /// Consistent snapshot of every operation and counter, operations in
    /// name order.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        MetricsSnapshot {
            operations: guard
                .ops
                .iter()
                .map(|(name, stats)| OpSnapshot {
                    operation: name.clone(),
                    count: stats.count,
                    mean_secs: stats.mean,
                    std_dev_secs: stats.std_dev(),
                    min_secs: stats.min,
                    max_secs: stats.max,
                    rolling_mean_secs: stats.rolling_mean(),
                })
                .collect(),
            counters: guard.counters.clone(),
        }
    }

    /// Write one CSV row per operation (header first) to `writer`.
    pub fn export_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let snapshot = self.snapshot();
        let mut out = csv::Writer::from_writer(writer);
        out.write_record([
            "operation",
            "count",
            "mean_secs",
            "std_dev_secs",
            "min_secs",
            "max_secs",
            "rolling_mean_secs",
        ])?;
        for op in &snapshot.operations {
            out.write_record(&[
                op.operation.clone(),
                op.count.to_string(),
                op.mean_secs.to_string(),
                op.std_dev_secs.to_string(),
                op.min_secs.to_string(),
                op.max_secs.to_string(),
                op.rolling_mean_secs.to_string(),
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}
