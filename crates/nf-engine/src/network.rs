//! Inventory-backed network: the graph plus the guid tables that tie graph
//! vertices and edges back to inventory rows.

use nf_core::{EdgeId, Nwid, Real, VertexId};
use nf_graph::{Graph, GraphBuilder, NwidIndex, TopologyPolicy};

use crate::error::EngineResult;

/// One row of the node inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub guid: String,
    pub nwid: Nwid,
    /// Value of the facility class column, when the caller selected one.
    pub role: Option<String>,
}

/// One row of the link inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub guid: String,
    pub from: Nwid,
    pub to: Nwid,
    pub weight: Real,
}

/// A node inventory row bound to its vertex.
#[derive(Debug, Clone)]
pub struct BoundNode {
    pub guid: String,
    pub vertex: VertexId,
    pub role: Option<String>,
}

/// A link inventory row bound to its (possibly shared) edge.
#[derive(Debug, Clone)]
pub struct BoundLink {
    pub guid: String,
    pub edge: EdgeId,
}

#[derive(Debug, Clone)]
pub struct Network {
    graph: Graph,
    index: NwidIndex,
    nodes: Vec<BoundNode>,
    links: Vec<BoundLink>,
}

impl Network {
    /// Build the graph from inventories. Node rows keep their table order.
    pub fn build(
        nodes: &[NodeRecord],
        links: &[LinkRecord],
        policy: TopologyPolicy,
    ) -> EngineResult<Self> {
        let mut builder = GraphBuilder::with_policy(policy);

        let bound_nodes: Vec<BoundNode> = nodes
            .iter()
            .map(|n| BoundNode {
                guid: n.guid.clone(),
                vertex: builder.add_node(n.nwid),
                role: n.role.clone(),
            })
            .collect();

        let mut bound_links = Vec::with_capacity(links.len());
        for link in links {
            let edge = builder.add_edge(link.from, link.to, link.weight)?;
            bound_links.push(BoundLink {
                guid: link.guid.clone(),
                edge,
            });
        }

        let graph = builder.build()?;
        let index = NwidIndex::from_graph(&graph);

        tracing::info!(
            nodes = bound_nodes.len(),
            links = bound_links.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "network built"
        );

        Ok(Self {
            graph,
            index,
            nodes: bound_nodes,
            links: bound_links,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn index(&self) -> &NwidIndex {
        &self.index
    }

    /// Node inventory rows in table order.
    pub fn nodes(&self) -> &[BoundNode] {
        &self.nodes
    }

    /// Link inventory rows in table order.
    pub fn links(&self) -> &[BoundLink] {
        &self.links
    }

    /// Node ids whose role column equals `class`, in node table order, deduplicated.
    pub fn nwids_with_role(&self, class: &str) -> Vec<Nwid> {
        let mut out: Vec<Nwid> = Vec::new();
        for node in &self.nodes {
            if node.role.as_deref() == Some(class) {
                let nwid = self.index.nwid(node.vertex);
                if !out.contains(&nwid) {
                    out.push(nwid);
                }
            }
        }
        out
    }
}
