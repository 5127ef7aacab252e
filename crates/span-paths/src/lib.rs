//! `span-paths` — candidate-route enumeration.
//!
//! Produces up to K routes between two nodes, pruned by travel-time budgets.
//! Two algorithms share one public entry point ([`PathEnumerator`]):
//!
//! - **DFS** — exhaustive depth-first walk with budget pruning.  Complete
//!   within its budgets on small graphs; cost grows with path count.
//! - **Yen K-shortest** — deviation-set construction over repeated Dijkstra
//!   runs.  Scales to larger graphs; yields exactly the K cheapest simple
//!   routes.
//!
//! `Auto` picks per graph size.  Results are always sorted by
//! `(total_travel_time, node sequence)`, so enumeration is deterministic for
//! a fixed graph and configuration — a property the scoring cache and every
//! downstream consumer relies on.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`config`]     | `PathEnumConfig`, `EnumMode`                          |
//! | [`enumerator`] | `PathEnumerator` — validation, dispatch, filtering    |
//! | [`dfs`]        | depth-first enumeration                               |
//! | [`yen`]        | K-shortest deviation construction                     |
//! | [`cache`]      | read-through memoization cache                        |
//! | [`error`]      | `PathError`, `PathResult<T>`                          |

pub mod cache;
pub mod config;
pub mod dfs;
pub mod enumerator;
pub mod error;
pub mod yen;


pub use cache::{CacheStats, EnumCache};
pub use config::{EnumMode, PathEnumConfig};
pub use enumerator::{PathEnumerator, enumerate_paths};
pub use error::{PathError, PathResult};
