//! Core graph data structures.

use nf_core::{EdgeId, Nwid, Real, VertexId};

/// A vertex in the network graph (a facility, substation, junction...).
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub nwid: Nwid,
    /// True when the vertex was created for a link endpoint missing from the node table.
    pub synthesized: bool,
}

/// An undirected, weighted edge (a power line, a pipeline...).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub a: VertexId,
    pub b: VertexId,
    pub weight: Real,
}

impl Edge {
    /// The endpoint opposite `v`. For self-loops this is `v` itself.
    pub fn other(&self, v: VertexId) -> VertexId {
        if self.a == v { self.b } else { self.a }
    }

    /// True if `v` is one of the endpoints.
    pub fn touches(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }
}

/// The graph: a validated, immutable collection of vertices and edges.
///
/// The graph stores:
/// - All vertices and edges in vectors (indexed by their IDs).
/// - Compact adjacency: for each vertex, which edges are incident.
///
/// The graph is read-only after `GraphBuilder::build` and is shared across
/// sample workers without copying.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<Edge>,

    /// Vertex i's incident edges are in vertex_edges[vertex_edge_offsets[i]..vertex_edge_offsets[i+1]].
    pub(crate) vertex_edge_offsets: Vec<usize>,

    /// Flat list of incident edge IDs (sorted by vertex ID then edge ID).
    pub(crate) vertex_edges: Vec<EdgeId>,
}

impl Graph {
    /// Return all vertices.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Return all edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Get a vertex by ID (returns None if ID out of bounds).
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.idx())
    }

    /// Get an edge by ID (returns None if ID out of bounds).
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.idx())
    }

    /// Edge IDs incident to a vertex. A self-loop is listed once.
    pub fn incident_edges(&self, v: VertexId) -> &[EdgeId] {
        let idx = v.idx();
        if idx >= self.vertices.len() {
            return &[];
        }
        let start = self.vertex_edge_offsets[idx];
        let end = self.vertex_edge_offsets[idx + 1];
        &self.vertex_edges[start..end]
    }

    /// Iterate `(edge, neighbor)` pairs around a vertex.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = (&Edge, VertexId)> + '_ {
        self.incident_edges(v).iter().map(move |&e| {
            let edge = &self.edges[e.idx()];
            (edge, edge.other(v))
        })
    }

    /// Sum of all edge weights; any simple path is no longer than this.
    pub fn total_weight(&self) -> Real {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Number of vertices created for dangling link endpoints.
    pub fn synthesized_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.synthesized).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_core::Id;

    #[test]
    fn edge_other_endpoint() {
        let e = Edge {
            id: Id::from_index(0),
            a: Id::from_index(3),
            b: Id::from_index(5),
            weight: 1.0,
        };
        assert_eq!(e.other(Id::from_index(3)), Id::from_index(5));
        assert_eq!(e.other(Id::from_index(5)), Id::from_index(3));
        assert!(e.touches(Id::from_index(5)));
        assert!(!e.touches(Id::from_index(4)));
    }

    #[test]
    fn self_loop_other_is_self() {
        let v = Id::from_index(2);
        let e = Edge {
            id: Id::from_index(0),
            a: v,
            b: v,
            weight: 0.0,
        };
        assert_eq!(e.other(v), v);
    }
}
