//! Graph-subsystem error type.

use thiserror::Error;

use span_core::NodeId;

/// Errors produced by `span-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Construction-time validation failed.  Fatal; the message lists every
    /// violation found.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    /// A node/edge sequence is not a contiguous route.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
