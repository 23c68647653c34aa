//! Source / distribution partition of the network's vertices.

use nf_core::{Nwid, VertexId};
use nf_graph::TopologyPolicy;

use crate::error::{EngineError, EngineResult};
use crate::network::Network;

/// How the source set is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    /// Explicit node ids (gate stations, pump stations...).
    Nodes(Vec<Nwid>),
    /// Every node whose role column equals this class.
    RoleClass(String),
}

impl SourceSelector {
    pub fn resolve(&self, network: &Network) -> Vec<Nwid> {
        match self {
            SourceSelector::Nodes(ids) => ids.clone(),
            SourceSelector::RoleClass(class) => network.nwids_with_role(class),
        }
    }
}

/// Which vertices inject service, which are ignored, and which are evaluated.
///
/// Distribution vertices are every vertex that is neither a source nor
/// excluded, in vertex order; each gets one row of the result matrix.
#[derive(Debug, Clone)]
pub struct Partition {
    sources: Vec<VertexId>,
    excluded: Vec<VertexId>,
    distribution: Vec<VertexId>,
    row_of: Vec<Option<usize>>,
}

impl Partition {
    /// Partition `network` around the given source and excluded node ids.
    ///
    /// Under `TopologyPolicy::Strict` an unknown source id is an error;
    /// otherwise it is logged and skipped. Unknown excluded ids are skipped.
    pub fn new(
        network: &Network,
        sources: &[Nwid],
        excluded: &[Nwid],
        policy: TopologyPolicy,
    ) -> EngineResult<Self> {
        let graph = network.graph();
        let index = network.index();
        let n = graph.vertex_count();

        let mut is_source = vec![false; n];
        let mut is_excluded = vec![false; n];

        for &nwid in sources {
            match index.get(nwid) {
                Some(v) => is_source[v.idx()] = true,
                None if policy == TopologyPolicy::Strict => {
                    return Err(EngineError::UnknownSource { nwid });
                }
                None => tracing::warn!(nwid, "source node not in network, ignoring"),
            }
        }
        for &nwid in excluded {
            match index.get(nwid) {
                Some(v) => is_excluded[v.idx()] = true,
                None => tracing::warn!(nwid, "excluded node not in network, ignoring"),
            }
        }

        let mut partition = Self {
            sources: Vec::new(),
            excluded: Vec::new(),
            distribution: Vec::new(),
            row_of: vec![None; n],
        };
        for vertex in graph.vertices() {
            let i = vertex.id.idx();
            if is_source[i] {
                partition.sources.push(vertex.id);
            } else if is_excluded[i] {
                partition.excluded.push(vertex.id);
            } else {
                partition.row_of[i] = Some(partition.distribution.len());
                partition.distribution.push(vertex.id);
            }
        }

        if partition.sources.is_empty() {
            tracing::warn!("source set is empty, every distribution node will be reported as failed");
        }
        tracing::debug!(
            sources = partition.sources.len(),
            excluded = partition.excluded.len(),
            distribution = partition.distribution.len(),
            "network partitioned"
        );

        Ok(partition)
    }

    pub fn sources(&self) -> &[VertexId] {
        &self.sources
    }

    pub fn excluded(&self) -> &[VertexId] {
        &self.excluded
    }

    pub fn distribution(&self) -> &[VertexId] {
        &self.distribution
    }

    /// Result-matrix row of a distribution vertex.
    pub fn row_of(&self, v: VertexId) -> Option<usize> {
        self.row_of.get(v.idx()).copied().flatten()
    }

    pub fn is_source(&self, v: VertexId) -> bool {
        self.sources.binary_search(&v).is_ok()
    }
}
