//! Shortest-path search over travel time.
//!
//! A binary heap keyed by `(cumulative travel time, node id)` — the node id
//! as secondary key makes equal-cost pops deterministic, and because
//! relaxation is strict (`<`), the route recorded for a tied destination is
//! the one found through the lexicographically smallest frontier node.
//!
//! Heap keys use `ordered_float::NotNan`: travel times are validated finite
//! and positive at graph construction, so sums never produce NaN; the
//! wrapper just gives `f64` a total order without an integer-cost detour.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::NotNan;
use rustc_hash::{FxHashMap, FxHashSet};

use span_core::NodeId;

use crate::error::GraphResult;
use crate::graph::{Edge, Graph};
use crate::path::RoutePath;
use crate::GraphError;

/// Minimum-travel-time route from `start` to `end`.
pub fn shortest_path(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
) -> GraphResult<Option<RoutePath>> {
    run(graph, start, end, None, None)
}

/// Restricted search: `blocked` nodes are never expanded (paths may not pass
/// through them) and `excluded_edges` pairs are skipped during relaxation.
///
/// The spur search of deviation-based enumeration blocks the root-prefix
/// nodes and excludes the deviation edges of already-accepted routes.
pub fn shortest_path_avoiding(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    blocked: &FxHashSet<NodeId>,
    excluded_edges: &FxHashSet<(NodeId, NodeId)>,
) -> GraphResult<Option<RoutePath>> {
    run(graph, start, end, Some(blocked), Some(excluded_edges))
}

fn run(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    blocked: Option<&FxHashSet<NodeId>>,
    excluded: Option<&FxHashSet<(NodeId, NodeId)>>,
) -> GraphResult<Option<RoutePath>> {
    for id in [start, end] {
        if !graph.contains(id) {
            return Err(GraphError::NodeNotFound(id.clone()));
        }
    }
    // A route needs at least one edge.
    if start == end {
        return Ok(None);
    }

    // dist[v] = best known cost (seconds) to reach v.
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    // prev[v] = edge that reached v on the best route.
    let mut prev: FxHashMap<NodeId, Edge> = FxHashMap::default();

    dist.insert(start.clone(), 0.0);

    // Min-heap via Reverse; secondary key NodeId for deterministic tie-breaks.
    let mut heap: BinaryHeap<Reverse<(NotNan<f64>, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((NotNan::default(), start.clone())));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == *end {
            return reconstruct(start, end, &prev).map(Some);
        }
        // Skip stale heap entries.
        if cost.into_inner() > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        // Blocked nodes are dead ends: they may be reached but never expanded.
        if blocked.is_some_and(|b| b.contains(&node)) && node != *start {
            continue;
        }

        for edge in graph.outgoing_edges(&node) {
            if excluded.is_some_and(|x| x.contains(&(edge.from.clone(), edge.to.clone()))) {
                continue;
            }
            let new_cost = cost.into_inner() + edge.travel_time_secs;
            if new_cost < dist.get(&edge.to).copied().unwrap_or(f64::INFINITY) {
                let Ok(key) = NotNan::new(new_cost) else {
                    continue; // unreachable for a validated graph
                };
                dist.insert(edge.to.clone(), new_cost);
                prev.insert(edge.to.clone(), edge.clone());
                heap.push(Reverse((key, edge.to.clone())));
            }
        }
    }

    Ok(None)
}

fn reconstruct(
    start: &NodeId,
    end: &NodeId,
    prev: &FxHashMap<NodeId, Edge>,
) -> GraphResult<RoutePath> {
    let mut edges = Vec::new();
    let mut cursor = end.clone();
    while cursor != *start {
        let Some(edge) = prev.get(&cursor) else {
            return Err(GraphError::InvalidPath(format!(
                "no predecessor recorded for {cursor}"
            )));
        };
        cursor = edge.from.clone();
        edges.push(edge.clone());
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(start.clone());
    nodes.extend(edges.iter().map(|e| e.to.clone()));
    RoutePath::new(nodes, edges)
}
