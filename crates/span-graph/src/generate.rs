//! Seeded random network generator.
//!
//! Produces strongly connected directed graphs with synthetic bridge tags
//! for property tests and benchmarks.  The same seed always yields the same
//! graph; node ids are zero-padded so lexicographic and numeric order agree.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

use span_core::NodeId;

use crate::error::GraphResult;
use crate::graph::{Graph, GraphBuilder, Node};

/// Generate a random road network.
///
/// - `node_count` — number of nodes (minimum 2).
/// - `extra_edges` — two-way segments added on top of the connecting chain.
/// - `bridge_every` — every n-th segment becomes a bridge tagged
///   `test_bridge_<k>`; `0` disables bridges.
/// - `seed` — generator seed; identical seeds produce identical graphs.
pub fn random_network(
    node_count: usize,
    extra_edges: usize,
    bridge_every: usize,
    seed: u64,
) -> GraphResult<Graph> {
    let node_count = node_count.max(2);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::with_capacity(node_count, (node_count + extra_edges) * 2);

    let ids: Vec<NodeId> = (0..node_count)
        .map(|i| NodeId::new(format!("n{i:04}")))
        .collect();
    for id in &ids {
        builder.add_node(Node::new(
            id.clone(),
            format!("gen {id}"),
            47.5 + rng.gen_range(0.0..0.2),
            -122.4 + rng.gen_range(0.0..0.2),
        ));
    }

    let mut segment = 0usize;
    let mut seen: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
    let mut add_segment = |builder: &mut GraphBuilder,
                           rng: &mut SmallRng,
                           seen: &mut FxHashSet<(NodeId, NodeId)>,
                           a: &NodeId,
                           b: &NodeId| {
        if a == b || !seen.insert((a.clone(), b.clone())) {
            return;
        }
        seen.insert((b.clone(), a.clone()));
        let bridge_name;
        let bridge = if bridge_every > 0 && segment % bridge_every == bridge_every - 1 {
            bridge_name = format!("test_bridge_{segment}");
            Some(bridge_name.as_str())
        } else {
            None
        };
        builder.add_two_way(
            a,
            b,
            rng.gen_range(30.0..600.0),
            rng.gen_range(100.0..3_000.0),
            bridge,
        );
        segment += 1;
    };

    // Chain keeps the graph strongly connected.
    for pair in ids.windows(2) {
        add_segment(&mut builder, &mut rng, &mut seen, &pair[0], &pair[1]);
    }
    for _ in 0..extra_edges {
        let a = &ids[rng.gen_range(0..node_count)];
        let b = &ids[rng.gen_range(0..node_count)];
        add_segment(&mut builder, &mut rng, &mut seen, a, b);
    }

    builder.build(None)
}
