//! Graph validation logic.

use std::collections::HashMap;

use nf_core::{EdgeId, VertexId};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, Vertex};

/// Validate the graph structure: ids are dense and every edge endpoint exists.
pub(crate) fn validate_structure(vertices: &[Vertex], edges: &[Edge]) -> GraphResult<()> {
    for (i, vertex) in vertices.iter().enumerate() {
        if vertex.id.idx() != i {
            return Err(GraphError::InvalidVertexRef {
                edge: EdgeId::from_index(0),
                vertex: vertex.id,
            });
        }
    }

    for (i, edge) in edges.iter().enumerate() {
        if edge.id.idx() != i {
            return Err(GraphError::InconsistentAdjacency {
                edge: edge.id,
                vertex: edge.a,
            });
        }
        for endpoint in [edge.a, edge.b] {
            if endpoint.idx() >= vertices.len() {
                return Err(GraphError::InvalidVertexRef {
                    edge: edge.id,
                    vertex: endpoint,
                });
            }
        }
    }

    Ok(())
}

/// Validate adjacency lists for consistency.
pub(crate) fn validate_adjacency(
    vertices: &[Vertex],
    edges: &[Edge],
    offsets: &[usize],
    flat: &[EdgeId],
) -> GraphResult<()> {
    if offsets.len() != vertices.len() + 1 {
        return Err(GraphError::InconsistentAdjacency {
            edge: EdgeId::from_index(0),
            vertex: vertices.first().map_or(VertexId::from_index(0), |v| v.id),
        });
    }

    let mut seen: HashMap<EdgeId, usize> = HashMap::new();
    for vertex in vertices {
        let idx = vertex.id.idx();
        for &edge_id in &flat[offsets[idx]..offsets[idx + 1]] {
            let Some(edge) = edges.get(edge_id.idx()) else {
                return Err(GraphError::InconsistentAdjacency {
                    edge: edge_id,
                    vertex: vertex.id,
                });
            };
            if !edge.touches(vertex.id) {
                return Err(GraphError::InconsistentAdjacency {
                    edge: edge_id,
                    vertex: vertex.id,
                });
            }
            *seen.entry(edge_id).or_default() += 1;
        }
    }

    // Each edge is listed once per distinct endpoint.
    for edge in edges {
        let expected = if edge.a == edge.b { 1 } else { 2 };
        if seen.get(&edge.id).copied().unwrap_or(0) != expected {
            return Err(GraphError::InconsistentAdjacency {
                edge: edge.id,
                vertex: edge.a,
            });
        }
    }

    Ok(())
}
