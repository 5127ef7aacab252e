//! Enumeration error type.

use thiserror::Error;

use span_core::{CoreError, NodeId};
use span_graph::GraphError;

/// Errors produced by route enumeration.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    /// No route survives the configured budgets.  Recoverable — callers may
    /// treat it as an empty result.
    #[error("no path exists from {start} to {end}")]
    NoPathExists { start: NodeId, end: NodeId },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Config(#[from] CoreError),
}

impl From<GraphError> for PathError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NodeNotFound(id) => PathError::NodeNotFound(id),
            GraphError::InvalidPath(reason) => PathError::InvalidPath(reason),
            GraphError::InvalidGraph(reason) => PathError::InvalidPath(reason),
        }
    }
}

pub type PathResult<T> = Result<T, PathError>;
