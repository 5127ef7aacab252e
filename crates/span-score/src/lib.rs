//! `span-score` — route traversability scoring.
//!
//! Given a route and a departure instant, the scorer asks the ETA
//! propagator when each drawbridge will be reached, builds a feature vector
//! per bridge (through a bounded cache), queries the predictor in batch,
//! and aggregates per-bridge open probabilities in the log domain into a
//! single route probability.  The journey analyzer combines route scores
//! into the probability that at least one route is traversable.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`features`]  | `FeatureBuilder` — the 14-value prediction features    |
//! | [`cache`]     | `FeatureCache` — bounded FIFO, reader-writer locked    |
//! | [`aggregate`] | log-domain aggregation and network probability         |
//! | [`scorer`]    | `PathScorer`, `PathScore`, `BatchScore`                |
//! | [`journey`]   | `JourneyAnalysis`                                      |
//! | [`metrics`]   | `ScoringMetrics` — per-operation stats, CSV export     |
//! | [`error`]     | `ScoreError`, `ScoreResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Adds `PathScorer::score_paths_parallel` (Rayon).         |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.       |

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod features;
pub mod journey;
pub mod metrics;
pub mod scorer;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate_log_domain, network_probability};
pub use cache::{FeatureCache, FeatureCacheStats, FeatureKey};
pub use error::{ScoreError, ScoreResult};
pub use features::{FEATURE_LEN, FeatureBuilder};
pub use journey::JourneyAnalysis;
pub use metrics::{MetricsSnapshot, OpSnapshot, ScoringMetrics};
pub use scorer::{BatchScore, PathScore, PathScorer};
