//! Monte Carlo sample states.
//!
//! On the wire a sample state is a comma-joined string of `0`/`1` flags, one
//! per sample (`"1,0,1"`; 1 = operational). The string is decoded into a bit
//! vector when a table is read and only re-encoded when results are written.

use std::collections::HashMap;

use bitvec::prelude::*;
use nf_core::{EdgeId, VertexId};

use crate::error::{EngineError, EngineResult};
use crate::network::Network;

/// Decode a `"1,0,1"` failure string.
pub fn parse_failure_string(guid: &str, failure: &str) -> EngineResult<BitVec> {
    let mut bits = BitVec::new();
    for (i, token) in failure.split(',').enumerate() {
        match token.trim() {
            "1" => bits.push(true),
            "0" => bits.push(false),
            other => {
                return Err(EngineError::InvalidFailureString {
                    guid: guid.to_string(),
                    reason: format!("sample {} has value {:?}, expected 0 or 1", i, other),
                });
            }
        }
    }
    Ok(bits)
}

/// Encode flags as a comma-joined `0`/`1` string.
pub fn encode_flags(bits: &BitSlice) -> String {
    let mut out = String::with_capacity(bits.len() * 2);
    for (i, bit) in bits.iter().by_vals().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push(if bit { '1' } else { '0' });
    }
    out
}

/// Per-entity sample states keyed by guid, in table order.
#[derive(Debug, Clone, Default)]
pub struct SampleTable {
    name: &'static str,
    num_samples: Option<usize>,
    rows: Vec<(String, BitVec)>,
    by_guid: HashMap<String, usize>,
}

impl SampleTable {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Build a table from `(guid, failure string)` rows.
    pub fn from_wire_rows<I, G, F>(name: &'static str, rows: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (G, F)>,
        G: Into<String>,
        F: AsRef<str>,
    {
        let mut table = Self::new(name);
        for (guid, failure) in rows {
            let guid = guid.into();
            let bits = parse_failure_string(&guid, failure.as_ref())?;
            table.insert(guid, bits)?;
        }
        Ok(table)
    }

    /// Insert a row. Every row must carry the same number of samples; a
    /// repeated guid replaces the earlier row.
    pub fn insert(&mut self, guid: impl Into<String>, bits: BitVec) -> EngineResult<()> {
        let guid = guid.into();
        match self.num_samples {
            Some(expected) if expected != bits.len() => {
                return Err(EngineError::SampleLengthMismatch {
                    table: self.name,
                    guid,
                    expected,
                    actual: bits.len(),
                });
            }
            _ => self.num_samples = Some(bits.len()),
        }

        if let Some(&pos) = self.by_guid.get(&guid) {
            tracing::warn!(table = self.name, guid = %guid, "duplicate guid in sample table, keeping last row");
            self.rows[pos].1 = bits;
        } else {
            self.by_guid.insert(guid.clone(), self.rows.len());
            self.rows.push((guid, bits));
        }
        Ok(())
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of samples per row, `None` while the table is empty.
    pub fn num_samples(&self) -> Option<usize> {
        self.num_samples
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, guid: &str) -> Option<&BitSlice> {
        self.by_guid.get(guid).map(|&i| self.rows[i].1.as_bitslice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BitSlice)> {
        self.rows.iter().map(|(g, b)| (g.as_str(), b.as_bitslice()))
    }

    /// Rows re-encoded in the wire format.
    pub fn to_wire_rows(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|(g, b)| (g.clone(), encode_flags(b)))
            .collect()
    }
}

/// Operational state of every vertex and edge in every sample.
///
/// Implementations are shared read-only across sample workers.
pub trait SampleProvider: Sync {
    fn num_samples(&self) -> usize;

    fn vertex_up(&self, vertex: VertexId, sample: usize) -> bool;

    fn edge_up(&self, edge: EdgeId, sample: usize) -> bool;
}

/// Nothing ever fails; only the network structure decides reachability.
#[derive(Debug, Clone, Copy)]
pub struct AllOperational {
    pub num_samples: usize,
}

impl SampleProvider for AllOperational {
    fn num_samples(&self) -> usize {
        self.num_samples
    }

    fn vertex_up(&self, _vertex: VertexId, _sample: usize) -> bool {
        true
    }

    fn edge_up(&self, _edge: EdgeId, _sample: usize) -> bool {
        true
    }
}

/// Sample tables joined onto the network's vertices and edges.
///
/// A vertex (edge) is down in a sample if any guid bound to it is down.
/// Entities with no row in the table are operational in every sample.
#[derive(Debug, Clone)]
pub struct BoundSamples {
    num_samples: usize,
    vertex_states: Vec<Option<BitVec>>,
    edge_states: Vec<Option<BitVec>>,
}

impl BoundSamples {
    /// Join node and link sample tables onto `network`.
    ///
    /// The sample count comes from `num_samples` or the tables; every
    /// supplied source must agree.
    pub fn bind(
        network: &Network,
        node_states: Option<&SampleTable>,
        link_states: Option<&SampleTable>,
        num_samples: Option<usize>,
    ) -> EngineResult<Self> {
        let num_samples = resolve_sample_count(num_samples, [node_states, link_states])?;

        let graph = network.graph();
        let mut vertex_states: Vec<Option<BitVec>> = vec![None; graph.vertex_count()];
        let mut edge_states: Vec<Option<BitVec>> = vec![None; graph.edge_count()];

        if let Some(table) = node_states {
            let bound = network
                .nodes()
                .iter()
                .map(|n| (n.guid.as_str(), n.vertex.idx()));
            join_table(table, bound, &mut vertex_states);
        }
        if let Some(table) = link_states {
            let bound = network.links().iter().map(|l| (l.guid.as_str(), l.edge.idx()));
            join_table(table, bound, &mut edge_states);
        }

        Ok(Self {
            num_samples,
            vertex_states,
            edge_states,
        })
    }

    /// Vertices that carry explicit sample data.
    pub fn vertices_with_data(&self) -> usize {
        self.vertex_states.iter().filter(|s| s.is_some()).count()
    }

    /// Edges that carry explicit sample data.
    pub fn edges_with_data(&self) -> usize {
        self.edge_states.iter().filter(|s| s.is_some()).count()
    }
}

impl SampleProvider for BoundSamples {
    fn num_samples(&self) -> usize {
        self.num_samples
    }

    fn vertex_up(&self, vertex: VertexId, sample: usize) -> bool {
        state_up(&self.vertex_states, vertex.idx(), sample)
    }

    fn edge_up(&self, edge: EdgeId, sample: usize) -> bool {
        state_up(&self.edge_states, edge.idx(), sample)
    }
}

fn state_up(states: &[Option<BitVec>], idx: usize, sample: usize) -> bool {
    match states.get(idx) {
        Some(Some(bits)) => bits.get(sample).is_some_and(|b| *b),
        _ => true,
    }
}

fn resolve_sample_count(
    declared: Option<usize>,
    tables: [Option<&SampleTable>; 2],
) -> EngineResult<usize> {
    let mut resolved = declared;
    for table in tables.into_iter().flatten() {
        let Some(actual) = table.num_samples() else {
            continue;
        };
        match resolved {
            Some(expected) if expected != actual => {
                return Err(EngineError::SampleCountMismatch {
                    table: table.name(),
                    expected,
                    actual,
                });
            }
            _ => resolved = Some(actual),
        }
    }
    match resolved {
        Some(n) if n > 0 => Ok(n),
        _ => Err(EngineError::NoSamples),
    }
}

fn join_table<'a>(
    table: &SampleTable,
    bound: impl Iterator<Item = (&'a str, usize)>,
    states: &mut [Option<BitVec>],
) {
    let mut matched = std::collections::HashSet::new();
    for (guid, idx) in bound {
        let Some(bits) = table.get(guid) else {
            continue;
        };
        matched.insert(guid);
        match states[idx].as_mut() {
            Some(existing) => {
                for (sample, up) in bits.iter().by_vals().enumerate() {
                    if !up {
                        existing.set(sample, false);
                    }
                }
            }
            None => states[idx] = Some(bits.to_bitvec()),
        }
    }

    let unmatched = table.len() - matched.len();
    if unmatched > 0 {
        tracing::warn!(
            table = table.name(),
            unmatched,
            "sample rows with no matching inventory guid were ignored"
        );
    }
}
