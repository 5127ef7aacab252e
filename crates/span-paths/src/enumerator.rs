//! The public enumeration entry point.

use span_core::NodeId;
use span_graph::{Graph, RoutePath};

use crate::cache::{CacheStats, EnumCache};
use crate::config::{EnumMode, PathEnumConfig};
use crate::error::{PathError, PathResult};
use crate::{dfs, yen};

/// One-shot enumeration with a throwaway, cache-less enumerator.
///
/// Applications issuing repeated queries should hold a [`PathEnumerator`]
/// (ideally via [`PathEnumerator::with_cache`]) instead.
pub fn enumerate_paths(
    graph: &Graph,
    start: &NodeId,
    end: &NodeId,
    config: PathEnumConfig,
) -> PathResult<Vec<RoutePath>> {
    PathEnumerator::new(config)?.enumerate(graph, start, end)
}

/// Enumerates candidate routes between two nodes.
///
/// Owns a validated [`PathEnumConfig`] and, optionally, a memoization
/// cache.  A `PathEnumerator` is immutable after construction and safe to
/// share across threads.
pub struct PathEnumerator {
    config: PathEnumConfig,
    cache: Option<EnumCache>,
}

impl PathEnumerator {
    /// Build an enumerator without memoization.
    pub fn new(config: PathEnumConfig) -> PathResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: None,
        })
    }

    /// Build an enumerator with a read-through memo cache.
    pub fn with_cache(config: PathEnumConfig) -> PathResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: Some(EnumCache::new()),
        })
    }

    pub fn config(&self) -> &PathEnumConfig {
        &self.config
    }

    /// Cache counters; `None` when memoization is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(EnumCache::stats)
    }

    /// Enumerate routes from `start` to `end`, cheapest first.
    ///
    /// Results are sorted by `(total_travel_time, node sequence)` and capped
    /// at `max_paths`.  Fails with [`PathError::NoPathExists`] when nothing
    /// survives the budgets.
    pub fn enumerate(
        &self,
        graph: &Graph,
        start: &NodeId,
        end: &NodeId,
    ) -> PathResult<Vec<RoutePath>> {
        for id in [start, end] {
            if !graph.contains(id) {
                return Err(PathError::NodeNotFound(id.clone()));
            }
        }

        let mode = self.config.resolved_mode(graph);
        let key = self
            .cache
            .as_ref()
            .map(|_| self.cache_key(graph, start, end, mode));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                return Ok(hit.as_ref().clone());
            }
        }

        // Baseline for the over-shortest budget.  When `end` is unreachable
        // the slack bound is infinite and only the absolute cap remains.
        let shortest_time = graph
            .shortest_path(start, end)?
            .map(|p| p.total_travel_time());
        let slack_bound = shortest_time
            .map(|t| t + self.config.max_time_over_shortest_secs)
            .unwrap_or(f64::INFINITY);
        let bound = slack_bound.min(self.config.max_travel_time_secs);

        let mut paths = match mode {
            EnumMode::Dfs => dfs::enumerate(graph, start, end, &self.config, bound)?,
            EnumMode::YenKShortest => {
                yen::k_shortest(graph, start, end, self.config.k_shortest_paths)?
            }
            EnumMode::Auto => unreachable!("resolved above"),
        };

        paths.retain(|p| p.total_travel_time() <= bound);
        paths.sort_by(|a, b| {
            a.total_travel_time()
                .total_cmp(&b.total_travel_time())
                .then_with(|| a.nodes().cmp(b.nodes()))
        });
        paths.truncate(self.config.max_paths);

        if paths.is_empty() {
            return Err(PathError::NoPathExists {
                start: start.clone(),
                end: end.clone(),
            });
        }

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, paths.clone());
        }
        Ok(paths)
    }

    /// Full query shape: endpoints, resolved algorithm, every knob that
    /// affects the result, and the graph content signature.
    fn cache_key(&self, graph: &Graph, start: &NodeId, end: &NodeId, mode: EnumMode) -> String {
        let c = &self.config;
        format!(
            "{start}|{end}|{mode:?}|{}|{}|{}|{}|{}|{}|{}",
            c.k_shortest_paths,
            c.max_depth,
            c.max_paths,
            c.max_travel_time_secs,
            c.max_time_over_shortest_secs,
            c.allow_cycles,
            graph.signature(),
        )
    }
}
