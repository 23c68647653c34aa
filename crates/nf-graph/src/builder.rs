//! Incremental graph builder.

use std::collections::HashMap;

use nf_core::{EdgeId, Nwid, Real, VertexId, ensure_weight};

use crate::error::{GraphError, GraphResult};
use crate::graph::{Edge, Graph, Vertex};
use crate::validate;

/// What to do when a link names a node id that is not in the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyPolicy {
    /// Create the missing vertex on the fly. It relays service but has no guid.
    #[default]
    Relaxed,
    /// Reject the link with `GraphError::UnknownEndpoint`.
    Strict,
}

/// Builder for constructing a graph incrementally.
///
/// Add every inventory node with `add_node` first, then the links with
/// `add_edge`, then call `build()` to validate and freeze the graph.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    policy: TopologyPolicy,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    by_nwid: HashMap<Nwid, VertexId>,
    by_pair: HashMap<(VertexId, VertexId), EdgeId>,
    edge_rows: usize,
}

impl GraphBuilder {
    /// Create a new empty builder with the relaxed topology policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: TopologyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> TopologyPolicy {
        self.policy
    }

    /// Add a node and return its vertex. Repeated ids return the existing vertex.
    pub fn add_node(&mut self, nwid: Nwid) -> VertexId {
        if let Some(&v) = self.by_nwid.get(&nwid) {
            return v;
        }
        self.push_vertex(nwid, false)
    }

    /// Add an undirected link between two node ids.
    ///
    /// A second link over the same unordered pair overwrites the weight of the
    /// first and returns the same edge id.
    pub fn add_edge(&mut self, from: Nwid, to: Nwid, weight: Real) -> GraphResult<EdgeId> {
        let row = self.edge_rows;
        self.edge_rows += 1;

        let weight = ensure_weight(weight, "edge weight")
            .map_err(|source| GraphError::InvalidWeight {
                edge_row: row,
                source,
            })?;
        let a = self.resolve_endpoint(row, from)?;
        let b = self.resolve_endpoint(row, to)?;
        let key = if a <= b { (a, b) } else { (b, a) };

        if let Some(&existing) = self.by_pair.get(&key) {
            tracing::debug!(from, to, "duplicate link, keeping last weight");
            self.edges[existing.idx()].weight = weight;
            return Ok(existing);
        }

        let id = EdgeId::from_usize(self.edges.len());
        self.edges.push(Edge { id, a, b, weight });
        self.by_pair.insert(key, id);
        Ok(id)
    }

    /// Look up the vertex for a node id added so far.
    pub fn vertex_of(&self, nwid: Nwid) -> Option<VertexId> {
        self.by_nwid.get(&nwid).copied()
    }

    /// Build and validate the graph, returning an immutable `Graph`.
    pub fn build(self) -> GraphResult<Graph> {
        validate::validate_structure(&self.vertices, &self.edges)?;

        let (vertex_edge_offsets, vertex_edges) = Self::build_adjacency(&self.vertices, &self.edges);

        validate::validate_adjacency(
            &self.vertices,
            &self.edges,
            &vertex_edge_offsets,
            &vertex_edges,
        )?;

        let synthesized = self.vertices.iter().filter(|v| v.synthesized).count();
        tracing::debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            synthesized,
            "graph built"
        );

        Ok(Graph {
            vertices: self.vertices,
            edges: self.edges,
            vertex_edge_offsets,
            vertex_edges,
        })
    }

    fn resolve_endpoint(&mut self, row: usize, nwid: Nwid) -> GraphResult<VertexId> {
        if let Some(&v) = self.by_nwid.get(&nwid) {
            return Ok(v);
        }
        match self.policy {
            TopologyPolicy::Strict => Err(GraphError::UnknownEndpoint { edge_row: row, nwid }),
            TopologyPolicy::Relaxed => {
                tracing::warn!(nwid, link_row = row, "link endpoint missing from node table, synthesizing vertex");
                Ok(self.push_vertex(nwid, true))
            }
        }
    }

    fn push_vertex(&mut self, nwid: Nwid, synthesized: bool) -> VertexId {
        let id = VertexId::from_usize(self.vertices.len());
        self.vertices.push(Vertex {
            id,
            nwid,
            synthesized,
        });
        self.by_nwid.insert(nwid, id);
        id
    }

    /// Build compact adjacency lists: for each vertex, collect its incident edges.
    fn build_adjacency(vertices: &[Vertex], edges: &[Edge]) -> (Vec<usize>, Vec<EdgeId>) {
        let mut per_vertex: Vec<Vec<EdgeId>> = vec![Vec::new(); vertices.len()];
        for edge in edges {
            per_vertex[edge.a.idx()].push(edge.id);
            if edge.b != edge.a {
                per_vertex[edge.b.idx()].push(edge.id);
            }
        }

        let mut offsets = Vec::with_capacity(vertices.len() + 1);
        let mut flat = Vec::with_capacity(edges.len() * 2);
        offsets.push(0);
        for mut list in per_vertex {
            list.sort_unstable();
            flat.extend_from_slice(&list);
            offsets.push(flat.len());
        }

        (offsets, flat)
    }
}
