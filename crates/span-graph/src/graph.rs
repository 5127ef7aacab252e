//! Road graph representation and builder.
//!
//! # Data layout
//!
//! The graph is a **simple directed graph**: at most one edge per ordered
//! `(from, to)` pair, enforced at construction.  Undirected streets are
//! modelled as two directed edges; for a two-way bridge both directions
//! carry the same bridge id.
//!
//! Adjacency lists are materialized in both directions and each list is
//! sorted lexicographically by the far endpoint, so every traversal that
//! walks neighbors in list order is deterministic without further sorting.
//! The node map and bridge index are `BTreeMap`s for the same reason —
//! iteration order is part of the public contract.
//!
//! # Construction
//!
//! [`GraphBuilder`] accepts nodes and edges in any order; [`build`]
//! validates everything at once and either returns an immutable [`Graph`]
//! or an error listing every violation.  A built graph is never mutated —
//! share it behind an `Arc`.
//!
//! [`build`]: GraphBuilder::build

use std::collections::BTreeMap;
use std::sync::OnceLock;

use rustc_hash::{FxHashMap, FxHashSet};

use span_core::{BridgePolicy, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::path::RoutePath;

// ── Node ──────────────────────────────────────────────────────────────────────

/// A graph node: an intersection or endpoint with a display name and a
/// WGS-84 position.
///
/// Equality and hashing consider the `id` only.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// A directed edge with a travel time, a physical length, and an optional
/// bridge tag.
///
/// An edge is a bridge exactly when `bridge` is `Some` — the two cannot get
/// out of sync because there is no separate flag.  Equality and hashing
/// consider `(from, to)` only: the graph is simple, so the endpoint pair
/// identifies the edge.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Nominal travel time in seconds.  Dijkstra cost.
    pub travel_time_secs: f64,
    /// Physical length in metres.
    pub distance_m: f64,
    /// Bridge id when this edge crosses a drawbridge.
    pub bridge: Option<String>,
}

impl Edge {
    /// A plain road edge.
    pub fn new(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        travel_time_secs: f64,
        distance_m: f64,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            travel_time_secs,
            distance_m,
            bridge: None,
        }
    }

    /// A bridge edge tagged with `bridge_id`.
    pub fn bridge(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        travel_time_secs: f64,
        distance_m: f64,
        bridge_id: impl Into<String>,
    ) -> Self {
        Self {
            bridge: Some(bridge_id.into()),
            ..Self::new(from, to, travel_time_secs, distance_m)
        }
    }

    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    #[inline]
    pub fn bridge_id(&self) -> Option<&str> {
        self.bridge.as_deref()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

// ── ValidationResult ──────────────────────────────────────────────────────────

/// Structured outcome of graph validation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
    /// Number of bridge edges (a two-way bridge counts twice).
    pub bridge_count: usize,
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Immutable directed road graph.
///
/// Construct via [`GraphBuilder`]; share behind an `Arc`.
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    edges: Vec<Edge>,
    outgoing: FxHashMap<NodeId, Vec<Edge>>,
    incoming: FxHashMap<NodeId, Vec<Edge>>,
    bridges: BTreeMap<String, Vec<Edge>>,
    signature: OnceLock<String>,
}

impl Graph {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of bridge edges.
    pub fn bridge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_bridge()).count()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of `id`, sorted by destination.  Empty for unknown nodes.
    #[inline]
    pub fn outgoing_edges(&self, id: &NodeId) -> &[Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Incoming edges of `id`, sorted by source.  Empty for unknown nodes.
    #[inline]
    pub fn incoming_edges(&self, id: &NodeId) -> &[Edge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Edges crossing the given bridge (both directions for two-way spans).
    pub fn edges_for_bridge(&self, bridge_id: &str) -> &[Edge] {
        self.bridges.get(bridge_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct bridge ids, ascending.
    pub fn bridge_ids(&self) -> impl Iterator<Item = &str> {
        self.bridges.keys().map(String::as_str)
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Re-run the construction checks against the built graph.
    ///
    /// Always reports `is_valid = true` for a graph obtained from
    /// [`GraphBuilder::build`] — construction fails rather than producing an
    /// invalid graph.
    pub fn validate(&self) -> ValidationResult {
        validate(self.nodes.values(), &self.edges, None)
    }

    // ── Signature ─────────────────────────────────────────────────────────

    /// Stable content signature: the sorted concatenation of edge tuples
    /// `(from, to, travel_time, distance, is_bridge, bridge_id)`.
    ///
    /// Computed lazily and cached; keys the enumeration memoization cache.
    pub fn signature(&self) -> &str {
        self.signature.get_or_init(|| {
            let mut tuples: Vec<String> = self
                .edges
                .iter()
                .map(|e| {
                    format!(
                        "{}|{}|{}|{}|{}|{}",
                        e.from,
                        e.to,
                        e.travel_time_secs,
                        e.distance_m,
                        e.is_bridge(),
                        e.bridge_id().unwrap_or("")
                    )
                })
                .collect();
            tuples.sort_unstable();
            tuples.join(";")
        })
    }

    // ── Routing (implementations in `dijkstra`) ───────────────────────────

    /// Minimum-travel-time path from `start` to `end`.
    ///
    /// Returns `Ok(None)` when `end` is unreachable or `start == end` (a
    /// route needs at least one edge).  Ties are broken by lexicographic
    /// node order, so the result is deterministic.
    pub fn shortest_path(&self, start: &NodeId, end: &NodeId) -> GraphResult<Option<RoutePath>> {
        crate::dijkstra::shortest_path(self, start, end)
    }

    /// [`shortest_path`](Self::shortest_path) over a restricted view:
    /// `blocked` nodes are never expanded and `excluded_edges` pairs are
    /// skipped.  Used for spur searches in deviation-based enumeration.
    pub fn shortest_path_avoiding(
        &self,
        start: &NodeId,
        end: &NodeId,
        blocked: &FxHashSet<NodeId>,
        excluded_edges: &FxHashSet<(NodeId, NodeId)>,
    ) -> GraphResult<Option<RoutePath>> {
        crate::dijkstra::shortest_path_avoiding(self, start, end, blocked, excluded_edges)
    }
}

// ── Validation core ───────────────────────────────────────────────────────────

/// Shared by builder-time and post-construction validation.
fn validate<'a>(
    nodes: impl Iterator<Item = &'a Node>,
    edges: &[Edge],
    policy: Option<&dyn BridgePolicy>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut ids = FxHashSet::default();
    let mut node_count = 0usize;
    for node in nodes {
        node_count += 1;
        if node.id.is_empty() {
            errors.push("node with empty id".to_string());
        }
        if !ids.insert(node.id.clone()) {
            errors.push(format!("duplicate node id {}", node.id));
        }
        if !node.lat.is_finite() || !node.lon.is_finite() {
            errors.push(format!("node {} has non-finite coordinates", node.id));
        }
    }

    let mut seen_pairs = FxHashSet::default();
    let mut unchecked_bridges = 0usize;
    let mut bridge_count = 0usize;
    for edge in edges {
        if edge.from == edge.to {
            errors.push(format!("self-loop at {}", edge.from));
        }
        for id in [&edge.from, &edge.to] {
            if !ids.contains(id) {
                errors.push(format!("edge {} -> {} references unknown node {id}", edge.from, edge.to));
            }
        }
        if !edge.travel_time_secs.is_finite() || edge.travel_time_secs <= 0.0 {
            errors.push(format!(
                "edge {} -> {} travel time {} must be finite and positive",
                edge.from, edge.to, edge.travel_time_secs
            ));
        }
        if !edge.distance_m.is_finite() || edge.distance_m <= 0.0 {
            errors.push(format!(
                "edge {} -> {} distance {} must be finite and positive",
                edge.from, edge.to, edge.distance_m
            ));
        }
        if !seen_pairs.insert((edge.from.clone(), edge.to.clone())) {
            // Parallel edges would make (from, to) equality weight-agnostic.
            errors.push(format!("duplicate edge {} -> {}", edge.from, edge.to));
        }
        match edge.bridge_id() {
            Some("") => errors.push(format!("edge {} -> {} has an empty bridge id", edge.from, edge.to)),
            Some(id) => {
                bridge_count += 1;
                match policy {
                    Some(p) if !p.is_accepted_bridge_id(id, true) => {
                        errors.push(format!("bridge id {id:?} is not in the accepted set"));
                    }
                    Some(_) => {}
                    None => unchecked_bridges += 1,
                }
            }
            None => {}
        }
    }
    if unchecked_bridges > 0 {
        warnings.push(format!(
            "no bridge policy supplied; {unchecked_bridges} bridge edge(s) not validated"
        ));
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        node_count,
        edge_count: edges.len(),
        bridge_count,
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`Graph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates the whole graph, sorts adjacency lists, and produces the
/// immutable [`Graph`].
///
/// # Example
///
/// ```
/// use span_graph::{Edge, GraphBuilder, Node};
///
/// let mut b = GraphBuilder::new();
/// b.add_node(Node::new("a", "A St", 47.65, -122.35));
/// b.add_node(Node::new("b", "B St", 47.66, -122.35));
/// b.add_edge(Edge::bridge("a", "b", 120.0, 800.0, "test_bridge"));
/// let graph = b.build(None).unwrap();
/// assert_eq!(graph.edge_count(), 1);
/// assert_eq!(graph.bridge_count(), 1);
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Add a **directed** edge.
    pub fn add_edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Convenience: add directed edges in **both directions** for an
    /// undirected street segment.  A bridge tag is shared by both directions.
    pub fn add_two_way(
        &mut self,
        a: &NodeId,
        b: &NodeId,
        travel_time_secs: f64,
        distance_m: f64,
        bridge_id: Option<&str>,
    ) -> &mut Self {
        let forward = Edge {
            from: a.clone(),
            to: b.clone(),
            travel_time_secs,
            distance_m,
            bridge: bridge_id.map(str::to_owned),
        };
        let backward = Edge {
            from: b.clone(),
            to: a.clone(),
            ..forward.clone()
        };
        self.edges.push(forward);
        self.edges.push(backward);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Validate without consuming the builder.
    ///
    /// With a policy, every bridge id must be in the accepted set
    /// (canonical or synthetic).  Without one, bridge ids are left to the
    /// scoring stage, which degrades unknown bridges to the predictor's
    /// default probability; a single warning records the skipped check.
    pub fn validate(&self, policy: Option<&dyn BridgePolicy>) -> ValidationResult {
        validate(self.nodes.iter(), &self.edges, policy)
    }

    /// Consume the builder and produce an immutable [`Graph`].
    ///
    /// Fails with [`GraphError::InvalidGraph`] listing every validation
    /// error if any check fails.
    pub fn build(self, policy: Option<&dyn BridgePolicy>) -> GraphResult<Graph> {
        let result = self.validate(policy);
        if !result.is_valid {
            return Err(GraphError::InvalidGraph(result.errors.join("; ")));
        }

        let nodes: BTreeMap<NodeId, Node> =
            self.nodes.into_iter().map(|n| (n.id.clone(), n)).collect();

        let mut outgoing: FxHashMap<NodeId, Vec<Edge>> = FxHashMap::default();
        let mut incoming: FxHashMap<NodeId, Vec<Edge>> = FxHashMap::default();
        let mut bridges: BTreeMap<String, Vec<Edge>> = BTreeMap::new();
        for edge in &self.edges {
            outgoing.entry(edge.from.clone()).or_default().push(edge.clone());
            incoming.entry(edge.to.clone()).or_default().push(edge.clone());
            if let Some(id) = edge.bridge_id() {
                bridges.entry(id.to_owned()).or_default().push(edge.clone());
            }
        }
        // Deterministic neighbor order for every traversal downstream.
        for list in outgoing.values_mut() {
            list.sort_unstable_by(|a, b| a.to.cmp(&b.to));
        }
        for list in incoming.values_mut() {
            list.sort_unstable_by(|a, b| a.from.cmp(&b.from));
        }
        for list in bridges.values_mut() {
            list.sort_unstable_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        }

        Ok(Graph {
            nodes,
            edges: self.edges,
            outgoing,
            incoming,
            bridges,
            signature: OnceLock::new(),
        })
    }
}
