//! `span-eta` — arrival-time propagation along routes.
//!
//! Walks a [`RoutePath`] from a departure instant, accumulating edge travel
//! times into per-node arrival estimates.  The bridge-filtered variant feeds
//! the path scorer: for every bridge edge it yields the instant the vehicle
//! reaches the span, which is what the opening predictor is asked about.
//!
//! The uncertainty variant grows a variance alongside the mean.  The growth
//! model is heuristic (congestion regime, bridge crossings, and long edges
//! widen it) and is not calibrated against ground truth — treat the summary
//! and its confidence intervals as informational.

use std::sync::Arc;

use span_core::{Clock, NodeId, TimeOfDay, Timestamp};
use span_graph::RoutePath;

#[cfg(test)]
mod tests;

// ── Eta ───────────────────────────────────────────────────────────────────────

/// Arrival estimate for one node along a route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eta {
    pub node_id: NodeId,
    pub arrival_time: Timestamp,
    /// Seconds since departure; 0 for the departure node.
    pub travel_time_from_start: f64,
}

// ── EtaSummary ────────────────────────────────────────────────────────────────

/// Accumulated travel-time uncertainty up to a point along a route.
///
/// `mean` is the cumulative nominal travel time in seconds; `min`/`max` span
/// a fixed ±30 % envelope around it.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EtaSummary {
    pub mean: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

impl EtaSummary {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self {
            mean,
            variance,
            min: mean * 0.7,
            max: mean * 1.3,
        }
    }

    #[inline]
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Symmetric confidence interval `(lo, hi)` around the mean, in seconds.
    ///
    /// `level` is one of 0.90, 0.95, 0.99; anything else falls back to the
    /// 95 % z-score.
    pub fn confidence_interval(&self, level: f64) -> (f64, f64) {
        let z = if level == 0.90 {
            1.645
        } else if level == 0.99 {
            2.576
        } else {
            1.960
        };
        let half = z * self.std_dev();
        (self.mean - half, self.mean + half)
    }
}

/// An [`Eta`] with its accumulated [`EtaSummary`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EtaEstimate {
    pub eta: Eta,
    pub summary: EtaSummary,
}

// ── EtaPropagator ─────────────────────────────────────────────────────────────

/// Travel time above which an edge is considered "long" for uncertainty
/// growth.
const LONG_EDGE_SECS: f64 = 300.0;

/// Walks routes and produces arrival estimates.
///
/// Pure given the injected clock: the same route and departure always yield
/// the same estimates.
pub struct EtaPropagator {
    clock: Arc<dyn Clock>,
}

impl EtaPropagator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Arrival estimate for every node on `route`, departure node first.
    pub fn estimate_etas(&self, route: &RoutePath, departure: Timestamp) -> Vec<Eta> {
        let mut etas = Vec::with_capacity(route.nodes().len());
        etas.push(Eta {
            node_id: route.start().clone(),
            arrival_time: departure,
            travel_time_from_start: 0.0,
        });
        let mut elapsed = 0.0;
        for edge in route.edges() {
            elapsed += edge.travel_time_secs;
            etas.push(Eta {
                node_id: edge.to.clone(),
                arrival_time: departure.offset_secs(elapsed),
                travel_time_from_start: elapsed,
            });
        }
        etas
    }

    /// `(bridge_id, Eta)` for every bridge edge on `route`, in traversal
    /// order.  The estimate is for the instant the vehicle reaches the span
    /// (arrival at the edge's entry node).
    pub fn bridge_etas(&self, route: &RoutePath, departure: Timestamp) -> Vec<(String, Eta)> {
        let mut out = Vec::new();
        let mut elapsed = 0.0;
        for edge in route.edges() {
            if let Some(bridge_id) = edge.bridge_id() {
                out.push((
                    bridge_id.to_owned(),
                    Eta {
                        node_id: edge.from.clone(),
                        arrival_time: departure.offset_secs(elapsed),
                        travel_time_from_start: elapsed,
                    },
                ));
            }
            elapsed += edge.travel_time_secs;
        }
        out
    }

    /// Per-node estimates with accumulated uncertainty.
    ///
    /// Each edge contributes `travel_time × 0.1` base variance, widened by
    /// the congestion multiplier of the local arrival hour, ×1.5 on bridge
    /// edges, and ×1.2 on edges longer than 5 minutes.
    pub fn estimate_with_uncertainty(
        &self,
        route: &RoutePath,
        departure: Timestamp,
    ) -> Vec<EtaEstimate> {
        let mut out = Vec::with_capacity(route.nodes().len());
        out.push(EtaEstimate {
            eta: Eta {
                node_id: route.start().clone(),
                arrival_time: departure,
                travel_time_from_start: 0.0,
            },
            summary: EtaSummary::new(0.0, 0.0),
        });

        let mut elapsed = 0.0;
        let mut variance = 0.0;
        for edge in route.edges() {
            let entered_at = departure.offset_secs(elapsed);
            let tod = TimeOfDay::from_hour(self.clock.local_time(entered_at).hour);

            let mut contribution = edge.travel_time_secs * 0.1 * tod.travel_multiplier();
            if edge.is_bridge() {
                contribution *= 1.5;
            }
            if edge.travel_time_secs > LONG_EDGE_SECS {
                contribution *= 1.2;
            }

            elapsed += edge.travel_time_secs;
            variance += contribution;
            out.push(EtaEstimate {
                eta: Eta {
                    node_id: edge.to.clone(),
                    arrival_time: departure.offset_secs(elapsed),
                    travel_time_from_start: elapsed,
                },
                summary: EtaSummary::new(elapsed, variance),
            });
        }
        out
    }
}
