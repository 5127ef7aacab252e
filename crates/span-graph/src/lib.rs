//! `span-graph` — directed road graph with bridge tagging and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`graph`]    | `Node`, `Edge`, `Graph`, `GraphBuilder`, `ValidationResult` |
//! | [`path`]     | `RoutePath` — contiguity-validated node/edge sequence     |
//! | [`dijkstra`] | Shortest-path search, plus the restricted variant used by deviation-based enumeration |
//! | [`generate`] | Seeded random network generator for tests and benchmarks  |
//! | [`error`]    | `GraphError`, `GraphResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.          |

pub mod dijkstra;
pub mod error;
pub mod generate;
pub mod graph;
pub mod path;


pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Graph, GraphBuilder, Node, ValidationResult};
pub use path::RoutePath;
