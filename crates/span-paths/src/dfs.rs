//! Depth-first route enumeration with budget pruning.

use rustc_hash::FxHashSet;

use span_core::NodeId;
use span_graph::{Graph, RoutePath};

use crate::config::PathEnumConfig;
use crate::error::PathResult;

/// Enumerate routes from `start` to `end` by depth-first walk.
///
/// `time_bound` is the partial-path pruning limit (already the tighter of
/// the absolute cap and the over-shortest slack; infinite when the shortest
/// route is unknown).  Adjacency lists are sorted, so the walk — and with it
/// the set of routes found under a `max_paths` cutoff — is deterministic.
pub fn enumerate(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    config: &PathEnumConfig,
    time_bound: f64,
) -> PathResult<Vec<RoutePath>> {
    let mut walk = Walk {
        graph,
        end,
        config,
        time_bound,
        found: Vec::new(),
    };
    let mut visited = FxHashSet::default();
    visited.insert(start.clone());
    walk.extend(start, &mut Vec::new(), &mut visited, 0.0)?;

    Ok(walk.found)
}

struct Walk<'a> {
    graph: &'a Graph,
    end: &'a NodeId,
    config: &'a PathEnumConfig,
    time_bound: f64,
    found: Vec<RoutePath>,
}

impl<'a> Walk<'a> {
    /// Extend the partial path ending at `node`.  `edges` and `visited` are
    /// the recursion-stack state; both are restored before returning.
    fn extend(
        &mut self,
        node: &NodeId,
        edges: &mut Vec<span_graph::Edge>,
        visited: &mut FxHashSet<NodeId>,
        elapsed: f64,
    ) -> PathResult<()> {
        if self.found.len() >= self.config.max_paths {
            return Ok(());
        }
        // Node-count cap: edges.len() + 1 nodes are on the path so far.
        if edges.len() + 1 >= self.config.max_depth {
            return Ok(());
        }

        let graph: &'a Graph = self.graph;
        for edge in graph.outgoing_edges(node) {
            if self.found.len() >= self.config.max_paths {
                break;
            }
            if !self.config.allow_cycles && visited.contains(&edge.to) {
                continue;
            }
            let new_elapsed = elapsed + edge.travel_time_secs;
            if new_elapsed > self.time_bound {
                continue;
            }

            edges.push(edge.clone());
            if edge.to == *self.end {
                self.found.push(assemble(edges)?);
            } else {
                let newly_visited = visited.insert(edge.to.clone());
                self.extend(&edge.to, edges, visited, new_elapsed)?;
                if newly_visited {
                    visited.remove(&edge.to);
                }
            }
            edges.pop();
        }
        Ok(())
    }
}

fn assemble(edges: &[span_graph::Edge]) -> PathResult<RoutePath> {
    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(edges[0].from.clone());
    nodes.extend(edges.iter().map(|e| e.to.clone()));
    Ok(RoutePath::new(nodes, edges.to_vec())?)
}
