//! Network id <-> vertex lookup.
//!
//! Inventories and parameters speak in external `nodenwid` integers; the
//! graph and the evaluator speak in dense vertex indices.

use std::collections::HashMap;

use nf_core::{Nwid, VertexId};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

#[derive(Debug, Clone)]
pub struct NwidIndex {
    to_vertex: HashMap<Nwid, VertexId>,
    to_nwid: Vec<Nwid>,
}

impl NwidIndex {
    /// Build an index from a graph.
    pub fn from_graph(graph: &Graph) -> Self {
        let to_nwid: Vec<Nwid> = graph.vertices().iter().map(|v| v.nwid).collect();
        let to_vertex = graph.vertices().iter().map(|v| (v.nwid, v.id)).collect();
        Self { to_vertex, to_nwid }
    }

    pub fn len(&self) -> usize {
        self.to_nwid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_nwid.is_empty()
    }

    pub fn get(&self, nwid: Nwid) -> Option<VertexId> {
        self.to_vertex.get(&nwid).copied()
    }

    /// Vertex for a node id, or `GraphError::NwidNotFound`.
    pub fn vertex(&self, nwid: Nwid) -> GraphResult<VertexId> {
        self.get(nwid).ok_or(GraphError::NwidNotFound { nwid })
    }

    /// Node id for a vertex (panics if out of bounds).
    pub fn nwid(&self, v: VertexId) -> Nwid {
        self.to_nwid[v.idx()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    #[test]
    fn index_round_trip() {
        let mut builder = GraphBuilder::new();
        builder.add_node(100);
        builder.add_node(7);
        builder.add_node(-3);
        let graph = builder.build().unwrap();
        let index = NwidIndex::from_graph(&graph);

        assert_eq!(index.len(), 3);
        for nwid in [100, 7, -3] {
            let v = index.vertex(nwid).unwrap();
            assert_eq!(index.nwid(v), nwid);
        }
    }

    #[test]
    fn index_unknown_id() {
        let mut builder = GraphBuilder::new();
        builder.add_node(1);
        let graph = builder.build().unwrap();
        let index = NwidIndex::from_graph(&graph);

        assert_eq!(
            index.vertex(999).unwrap_err(),
            GraphError::NwidNotFound { nwid: 999 }
        );
        assert!(index.get(999).is_none());
    }
}
