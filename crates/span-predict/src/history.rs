//! Historical bridge-opening data contract.
//!
//! Baseline predictors estimate open probability from observed opening
//! frequencies, bucketed by [`DateBucket`] (5-minute local-time slot ×
//! weekday/weekend, 576 slots).  Storage lives in the embedding application;
//! the engine only consumes per-bucket counts through [`HistoryProvider`].

use rustc_hash::FxHashMap;

use span_core::{DateBucket, Timestamp};

// ── BucketStats ───────────────────────────────────────────────────────────────

/// Observed open/total counts for one `(bridge, bucket)` cell.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketStats {
    /// Observations where the bridge was open to road traffic.
    pub open_count: u64,
    pub total_count: u64,
    /// Most recent observation in the cell, if tracked.
    pub last_seen: Option<Timestamp>,
    /// Distinct sampling sessions contributing to the cell.
    pub sample_count: u64,
}

impl BucketStats {
    /// `open / total`, or `None` for an empty cell.
    pub fn raw_probability(&self) -> Option<f64> {
        (self.total_count > 0).then(|| self.open_count as f64 / self.total_count as f64)
    }

    /// Beta-smoothed probability `(open + α) / (total + α + β)`.
    ///
    /// Well-defined even for empty cells (it degrades to the prior mean).
    pub fn smoothed_probability(&self, alpha: f64, beta: f64) -> f64 {
        (self.open_count as f64 + alpha) / (self.total_count as f64 + alpha + beta)
    }
}

// ── HistoryProvider ───────────────────────────────────────────────────────────

/// Read-side contract for historical opening data.
///
/// Implementations must be `Send + Sync` and should answer from memory or a
/// local cache — the scorer may query inside its hot path.
pub trait HistoryProvider: Send + Sync {
    /// Counts for `(bridge_id, bucket)`, or `None` when the cell was never
    /// observed.
    fn bucket_stats(&self, bridge_id: &str, bucket: DateBucket) -> Option<BucketStats>;
}

/// In-memory provider, for tests and small datasets.
#[derive(Default)]
pub struct MemoryHistory {
    cells: FxHashMap<(String, u32), BucketStats>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cell.
    pub fn set(&mut self, bridge_id: impl Into<String>, bucket: DateBucket, stats: BucketStats) {
        self.cells.insert((bridge_id.into(), bucket.index()), stats);
    }

    /// Record one observation into a cell.
    pub fn record(&mut self, bridge_id: impl Into<String>, bucket: DateBucket, open: bool, at: Timestamp) {
        let cell = self.cells.entry((bridge_id.into(), bucket.index())).or_default();
        cell.total_count += 1;
        if open {
            cell.open_count += 1;
        }
        cell.sample_count += 1;
        cell.last_seen = Some(at);
    }
}

impl HistoryProvider for MemoryHistory {
    fn bucket_stats(&self, bridge_id: &str, bucket: DateBucket) -> Option<BucketStats> {
        self.cells.get(&(bridge_id.to_owned(), bucket.index())).copied()
    }
}
