//! Journey-level analysis: combine route scores into a network probability.

use span_core::{NodeId, Timestamp};
use span_graph::RoutePath;

use crate::aggregate::network_probability;
use crate::error::{ScoreError, ScoreResult};
use crate::scorer::{PathScore, PathScorer};

/// Aggregated outcome for one origin/destination journey.
#[derive(Clone, Debug)]
pub struct JourneyAnalysis {
    pub start: NodeId,
    pub end: NodeId,
    pub departure_time: Timestamp,
    /// Per-route scores in input order (failed routes omitted).
    pub path_scores: Vec<PathScore>,
    /// Probability that at least one scored route is traversable.
    pub network_probability: f64,
    /// The best single-route probability.
    pub best_path_probability: f64,
    /// Routes submitted for analysis, including any that failed to score.
    pub total_paths_analyzed: usize,
}

impl PathScorer {
    /// Score every route and aggregate into a [`JourneyAnalysis`].
    ///
    /// `routes` are assumed to connect `start` to `end`; per-route failures
    /// follow the [`score_paths`](PathScorer::score_paths) policy.
    pub fn analyze_journey(
        &self,
        routes: &[RoutePath],
        start: &NodeId,
        end: &NodeId,
        departure: Timestamp,
    ) -> ScoreResult<JourneyAnalysis> {
        if start.is_empty() || end.is_empty() {
            return Err(ScoreError::InvalidPath(
                "journey endpoints must be non-empty node ids".into(),
            ));
        }

        let batch = self.score_paths(routes, departure)?;
        let probabilities: Vec<f64> = batch
            .scores
            .iter()
            .map(|s| s.linear_probability)
            .collect();

        Ok(JourneyAnalysis {
            start: start.clone(),
            end: end.clone(),
            departure_time: departure,
            network_probability: network_probability(&probabilities),
            best_path_probability: probabilities.iter().copied().fold(0.0, f64::max),
            path_scores: batch.scores,
            total_paths_analyzed: routes.len(),
        })
    }
}
