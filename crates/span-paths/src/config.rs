//! Enumeration configuration.

use span_core::{CoreError, CoreResult};
use span_graph::Graph;

/// Which enumeration algorithm to run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnumMode {
    /// Exhaustive depth-first walk with budget pruning.
    Dfs,
    /// Yen's K-shortest deviation construction.
    YenKShortest,
    /// Pick per graph size; see [`PathEnumConfig::resolved_mode`].
    #[default]
    Auto,
}

/// Tunables for route enumeration.
///
/// | Knob                         | Effect                                              |
/// |------------------------------|-----------------------------------------------------|
/// | `mode`                       | Algorithm selection; `Auto` decides per graph size. |
/// | `max_paths`                  | Cap on returned routes.                             |
/// | `max_depth`                  | DFS cap on nodes per route.                         |
/// | `max_travel_time_secs`       | Absolute travel-time cap per route.                 |
/// | `max_time_over_shortest_secs`| Slack over the shortest route's travel time.        |
/// | `k_shortest_paths`           | Target K for Yen.                                   |
/// | `allow_cycles`               | DFS only: permit node revisits within a route.      |
/// | `random_seed`                | Salt for downstream feature hashing.  Does not      |
/// |                              | affect enumeration order.                           |
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathEnumConfig {
    pub mode: EnumMode,
    pub max_paths: usize,
    pub max_depth: usize,
    pub max_travel_time_secs: f64,
    pub max_time_over_shortest_secs: f64,
    pub k_shortest_paths: usize,
    pub allow_cycles: bool,
    pub random_seed: u64,
}

impl Default for PathEnumConfig {
    fn default() -> Self {
        Self {
            mode: EnumMode::Auto,
            max_paths: 20,
            max_depth: 50,
            max_travel_time_secs: 3_600.0,
            max_time_over_shortest_secs: 900.0,
            k_shortest_paths: 10,
            allow_cycles: false,
            random_seed: 0,
        }
    }
}

impl PathEnumConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_paths == 0 {
            return Err(CoreError::Configuration("max_paths must be at least 1".into()));
        }
        if self.max_depth < 2 {
            return Err(CoreError::Configuration(
                "max_depth must be at least 2 (a route has two endpoints)".into(),
            ));
        }
        if self.k_shortest_paths == 0 {
            return Err(CoreError::Configuration(
                "k_shortest_paths must be at least 1".into(),
            ));
        }
        // Budgets may be infinite (disabled) but never NaN or non-positive.
        for (name, v) in [
            ("max_travel_time_secs", self.max_travel_time_secs),
            ("max_time_over_shortest_secs", self.max_time_over_shortest_secs),
        ] {
            if v.is_nan() || v <= 0.0 {
                return Err(CoreError::Configuration(format!(
                    "{name} must be positive (or infinite to disable), got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Resolve `Auto` against the graph: Yen for larger graphs
    /// (`|V| > 20` or `|E| > 50`) or when K is small relative to `max_paths`;
    /// DFS otherwise.
    pub fn resolved_mode(&self, graph: &Graph) -> EnumMode {
        match self.mode {
            EnumMode::Auto => {
                if graph.node_count() > 20
                    || graph.edge_count() > 50
                    || self.k_shortest_paths < self.max_paths / 2
                {
                    EnumMode::YenKShortest
                } else {
                    EnumMode::Dfs
                }
            }
            fixed => fixed,
        }
    }
}
