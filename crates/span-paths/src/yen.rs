//! Yen's K-shortest simple paths.
//!
//! Deviation-set construction: take the Dijkstra shortest path, then
//! repeatedly branch off ("spur") at every prefix of the last accepted
//! route.  For each spur the search excludes the deviation edges of every
//! accepted route sharing that prefix — forcing a genuinely new
//! continuation — and blocks the prefix's interior nodes so spur paths stay
//! simple.  The cheapest candidate is promoted each round.
//!
//! Candidates are deduplicated by node sequence; with at most one edge per
//! ordered node pair, equal node sequences imply equal edge sequences.

use rustc_hash::FxHashSet;

use span_core::NodeId;
use span_graph::{Graph, RoutePath};

use crate::error::PathResult;

/// Up to `k` cheapest simple routes from `start` to `end`, cheapest first.
///
/// Returns fewer than `k` routes when the graph does not contain that many,
/// and an empty vector when `end` is unreachable.
pub fn k_shortest(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    k: usize,
) -> PathResult<Vec<RoutePath>> {
    let Some(first) = graph.shortest_path(start, end)? else {
        return Ok(Vec::new());
    };

    let mut accepted = vec![first];
    let mut candidates: Vec<RoutePath> = Vec::new();
    // Node sequences of everything in `accepted` or `candidates`.  Rejected
    // candidates stay recorded, otherwise each round would regenerate them.
    let mut seen: FxHashSet<Vec<NodeId>> = FxHashSet::default();
    seen.insert(accepted[0].nodes().to_vec());

    while accepted.len() < k {
        let prev = accepted[accepted.len() - 1].clone();

        for i in 0..prev.nodes().len() - 1 {
            let spur_node = &prev.nodes()[i];
            let root_nodes = &prev.nodes()[..=i];

            // Deviation edges of accepted routes sharing this root prefix.
            let mut excluded: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
            for path in &accepted {
                if path.nodes().len() > i + 1 && &path.nodes()[..=i] == root_nodes {
                    let edge = &path.edges()[i];
                    excluded.insert((edge.from.clone(), edge.to.clone()));
                }
            }
            // Interior root nodes may not be revisited by the spur.
            let blocked: FxHashSet<NodeId> = root_nodes[..i].iter().cloned().collect();

            let Some(spur) = graph.shortest_path_avoiding(spur_node, end, &blocked, &excluded)?
            else {
                continue;
            };

            let mut nodes = root_nodes[..i].to_vec();
            nodes.extend(spur.nodes().iter().cloned());
            let mut edges = prev.edges()[..i].to_vec();
            edges.extend(spur.edges().iter().cloned());
            let candidate = RoutePath::new(nodes, edges)?;

            if seen.insert(candidate.nodes().to_vec()) {
                candidates.push(candidate);
            }
        }

        // Promote the cheapest candidate; node order breaks cost ties.
        let Some(best) = candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.total_travel_time()
                    .total_cmp(&b.total_travel_time())
                    .then_with(|| a.nodes().cmp(b.nodes()))
            })
            .map(|(i, _)| i)
        else {
            break;
        };
        accepted.push(candidates.swap_remove(best));
    }

    Ok(accepted)
}
