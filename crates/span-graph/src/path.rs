//! `RoutePath` — a contiguity-validated route through the graph.

use span_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::Edge;

/// A route: `n ≥ 2` nodes joined by `n − 1` edges, with cached totals.
///
/// The contiguity invariant (`edges[i].from == nodes[i]` and
/// `edges[i].to == nodes[i+1]`) is checked by the constructor, so holding a
/// `RoutePath` is proof the sequence is well-formed.  Equality and hashing
/// consider the node sequence only.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePath {
    nodes: Vec<NodeId>,
    edges: Vec<Edge>,
    total_travel_time: f64,
    total_distance: f64,
    bridge_count: usize,
}

impl RoutePath {
    /// Build a route, validating shape and contiguity.
    pub fn new(nodes: Vec<NodeId>, edges: Vec<Edge>) -> GraphResult<Self> {
        if nodes.len() < 2 {
            return Err(GraphError::InvalidPath(format!(
                "route needs at least 2 nodes, got {}",
                nodes.len()
            )));
        }
        if edges.len() != nodes.len() - 1 {
            return Err(GraphError::InvalidPath(format!(
                "route with {} nodes needs {} edges, got {}",
                nodes.len(),
                nodes.len() - 1,
                edges.len()
            )));
        }
        for (i, edge) in edges.iter().enumerate() {
            if edge.from != nodes[i] || edge.to != nodes[i + 1] {
                return Err(GraphError::InvalidPath(format!(
                    "edge {} -> {} does not connect {} to {}",
                    edge.from,
                    edge.to,
                    nodes[i],
                    nodes[i + 1]
                )));
            }
        }

        let total_travel_time = edges.iter().map(|e| e.travel_time_secs).sum();
        let total_distance = edges.iter().map(|e| e.distance_m).sum();
        let bridge_count = edges.iter().filter(|e| e.is_bridge()).count();
        Ok(Self {
            nodes,
            edges,
            total_travel_time,
            total_distance,
            bridge_count,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn total_travel_time(&self) -> f64 {
        self.total_travel_time
    }

    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    #[inline]
    pub fn bridge_count(&self) -> usize {
        self.bridge_count
    }

    /// Origin node.  Infallible: a route always has at least 2 nodes.
    pub fn start(&self) -> &NodeId {
        &self.nodes[0]
    }

    /// Destination node.
    pub fn end(&self) -> &NodeId {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Re-check the constructor invariant.  Always true for values built
    /// through [`RoutePath::new`].
    pub fn is_contiguous(&self) -> bool {
        self.nodes.len() >= 2
            && self.edges.len() == self.nodes.len() - 1
            && self
                .edges
                .iter()
                .enumerate()
                .all(|(i, e)| e.from == self.nodes[i] && e.to == self.nodes[i + 1])
    }

    /// `true` when no node repeats.
    pub fn is_simple(&self) -> bool {
        let mut seen = rustc_hash::FxHashSet::default();
        self.nodes.iter().all(|n| seen.insert(n))
    }

    /// Bridge edges along the route, in traversal order.
    pub fn bridge_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.is_bridge())
    }
}

impl PartialEq for RoutePath {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for RoutePath {}

impl std::hash::Hash for RoutePath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
    }
}
