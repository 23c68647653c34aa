//! Graph-specific error types.

use nf_core::{EdgeId, NfError, Nwid, VertexId};

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A link names an endpoint that is not in the node inventory.
    UnknownEndpoint { edge_row: usize, nwid: Nwid },

    /// An edge weight is negative or not finite.
    InvalidWeight { edge_row: usize, source: NfError },

    /// An edge refers to a vertex that doesn't exist.
    InvalidVertexRef { edge: EdgeId, vertex: VertexId },

    /// Adjacency list is inconsistent (edge in a vertex's list but not incident to it).
    InconsistentAdjacency { edge: EdgeId, vertex: VertexId },

    /// Network id not present in the graph.
    NwidNotFound { nwid: Nwid },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::UnknownEndpoint { edge_row, nwid } => {
                write!(
                    f,
                    "Link row {} refers to node id {} which is not in the node table",
                    edge_row, nwid
                )
            }
            GraphError::InvalidWeight { edge_row, source } => {
                write!(f, "Link row {} has an invalid weight: {}", edge_row, source)
            }
            GraphError::InvalidVertexRef { edge, vertex } => {
                write!(f, "Edge {} refers to non-existent vertex {}", edge, vertex)
            }
            GraphError::InconsistentAdjacency { edge, vertex } => {
                write!(
                    f,
                    "Edge {} in vertex {}'s adjacency list but not incident to it",
                    edge, vertex
                )
            }
            GraphError::NwidNotFound { nwid } => {
                write!(f, "Node id {} not found in graph", nwid)
            }
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::InvalidWeight { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<GraphError> for NfError {
    fn from(err: GraphError) -> Self {
        NfError::Invariant {
            what: err.to_string(),
        }
    }
}
