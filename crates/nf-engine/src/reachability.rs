//! Per-sample reachability from the source set.
//!
//! A failed vertex disables every incident edge, so node failures reach the
//! shortest-path search purely through edge weights. Failed edges are
//! penalized through a weight override; the shared graph is never copied.

use bitvec::prelude::*;
use nf_core::{EdgeId, Real, VertexId, ensure_finite};
use nf_graph::{Edge, Graph, multi_source_dijkstra};

use crate::error::{EngineError, EngineResult};
use crate::roles::Partition;
use crate::samples::SampleProvider;

/// How failed edges are represented in the shortest-path search.
///
/// Every policy yields the same functional flags; they differ only in the
/// distances reported by `Evaluator::distances`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PenaltyPolicy {
    /// Failed edges are impassable. Functional iff any path exists.
    #[default]
    Exclude,
    /// Failed edges weigh a sentinel `M`. Functional iff distance < `M`.
    Sentinel(SentinelWeight),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SentinelWeight {
    /// `M` strictly above the total network weight, larger than any real path.
    Auto,
    /// Caller-supplied constant; must exceed the total network weight.
    Fixed(Real),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Penalty {
    Exclude,
    Sentinel(Real),
}

pub struct Evaluator<'a, P: SampleProvider> {
    graph: &'a Graph,
    partition: &'a Partition,
    samples: &'a P,
    penalty: Penalty,
}

impl<'a, P: SampleProvider> Evaluator<'a, P> {
    pub fn new(
        graph: &'a Graph,
        partition: &'a Partition,
        samples: &'a P,
        policy: PenaltyPolicy,
    ) -> EngineResult<Self> {
        let total = graph.total_weight();
        let penalty = match policy {
            PenaltyPolicy::Exclude => Penalty::Exclude,
            PenaltyPolicy::Sentinel(SentinelWeight::Auto) => Penalty::Sentinel(auto_sentinel(total)),
            PenaltyPolicy::Sentinel(SentinelWeight::Fixed(m)) => {
                let m = ensure_finite(m, "sentinel weight")?;
                if m <= total {
                    return Err(EngineError::SentinelTooSmall { sentinel: m, total });
                }
                Penalty::Sentinel(m)
            }
        };
        Ok(Self {
            graph,
            partition,
            samples,
            penalty,
        })
    }

    /// The sentinel weight in effect, if any.
    pub fn sentinel(&self) -> Option<Real> {
        match self.penalty {
            Penalty::Exclude => None,
            Penalty::Sentinel(m) => Some(m),
        }
    }

    /// An edge is bad if it failed itself or either endpoint failed.
    pub fn is_bad_edge(&self, edge: &Edge, sample: usize) -> bool {
        !self.samples.edge_up(edge.id, sample)
            || !self.samples.vertex_up(edge.a, sample)
            || !self.samples.vertex_up(edge.b, sample)
    }

    pub fn bad_vertices(&self, sample: usize) -> Vec<VertexId> {
        self.graph
            .vertices()
            .iter()
            .map(|v| v.id)
            .filter(|&v| !self.samples.vertex_up(v, sample))
            .collect()
    }

    pub fn bad_edges(&self, sample: usize) -> Vec<EdgeId> {
        self.graph
            .edges()
            .iter()
            .filter(|e| self.is_bad_edge(e, sample))
            .map(|e| e.id)
            .collect()
    }

    /// Penalized shortest distance from the source set to every vertex.
    pub fn distances(&self, sample: usize) -> Vec<Option<Real>> {
        match self.penalty {
            Penalty::Exclude => multi_source_dijkstra(
                self.graph,
                self.partition.sources(),
                |e| (!self.is_bad_edge(e, sample)).then_some(e.weight),
                None,
            ),
            Penalty::Sentinel(m) => multi_source_dijkstra(
                self.graph,
                self.partition.sources(),
                |e| Some(if self.is_bad_edge(e, sample) { m } else { e.weight }),
                Some(m),
            ),
        }
    }

    /// Functional flag of every distribution vertex (partition row order).
    pub fn evaluate(&self, sample: usize) -> BitVec {
        let rows = self.partition.distribution().len();
        if self.partition.sources().is_empty() {
            return bitvec![0; rows];
        }

        let dist = self.distances(sample);
        let mut flags = BitVec::with_capacity(rows);
        for &v in self.partition.distribution() {
            let d = dist[v.idx()];
            let functional = match self.penalty {
                Penalty::Exclude => d.is_some(),
                Penalty::Sentinel(m) => d.is_some_and(|d| d < m),
            };
            flags.push(functional);
        }
        flags
    }
}

/// `total + 1`, widened to at least one ulp above `total` once adding 1
/// no longer changes the value.
fn auto_sentinel(total: Real) -> Real {
    total + (total * Real::EPSILON).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{LinkRecord, Network, NodeRecord};
    use crate::samples::{AllOperational, BoundSamples, SampleTable};
    use nf_graph::TopologyPolicy;

    /// S(1) - A(2) - B(3), plus an isolated C(4).
    fn chain() -> Network {
        let nodes: Vec<NodeRecord> = [("S", 1), ("A", 2), ("B", 3), ("C", 4)]
            .into_iter()
            .map(|(g, n)| NodeRecord {
                guid: g.into(),
                nwid: n,
                role: None,
            })
            .collect();
        let links = vec![
            LinkRecord {
                guid: "SA".into(),
                from: 1,
                to: 2,
                weight: 2.0,
            },
            LinkRecord {
                guid: "AB".into(),
                from: 2,
                to: 3,
                weight: 3.0,
            },
        ];
        Network::build(&nodes, &links, TopologyPolicy::Relaxed).unwrap()
    }

    const POLICIES: [PenaltyPolicy; 3] = [
        PenaltyPolicy::Exclude,
        PenaltyPolicy::Sentinel(SentinelWeight::Auto),
        PenaltyPolicy::Sentinel(SentinelWeight::Fixed(9999.0)),
    ];

    #[test]
    fn structural_disconnection_is_not_functional() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let samples = AllOperational { num_samples: 1 };
        for policy in POLICIES {
            let eval = Evaluator::new(net.graph(), &part, &samples, policy).unwrap();
            assert_eq!(eval.evaluate(0), bitvec![1, 1, 0], "{policy:?}");
        }
    }

    #[test]
    fn failed_node_cuts_downstream() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let nodes = SampleTable::from_wire_rows("nodes", [("A", "1,0")]).unwrap();
        let samples = BoundSamples::bind(&net, Some(&nodes), None, None).unwrap();

        for policy in POLICIES {
            let eval = Evaluator::new(net.graph(), &part, &samples, policy).unwrap();
            assert_eq!(eval.evaluate(0), bitvec![1, 1, 0]);
            assert_eq!(eval.evaluate(1), bitvec![0, 0, 0]);
            assert_eq!(eval.bad_vertices(1), vec![net.index().vertex(2).unwrap()]);
            assert_eq!(eval.bad_edges(1).len(), 2);
            assert!(eval.bad_edges(0).is_empty());
        }
    }

    #[test]
    fn failed_link_cuts_downstream() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let links = SampleTable::from_wire_rows("links", [("AB", "0")]).unwrap();
        let samples = BoundSamples::bind(&net, None, Some(&links), None).unwrap();

        let eval = Evaluator::new(net.graph(), &part, &samples, PenaltyPolicy::Exclude).unwrap();
        assert_eq!(eval.evaluate(0), bitvec![1, 0, 0]);
    }

    #[test]
    fn sentinel_distances_carry_penalty() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let links = SampleTable::from_wire_rows("links", [("AB", "0")]).unwrap();
        let samples = BoundSamples::bind(&net, None, Some(&links), None).unwrap();

        let eval = Evaluator::new(
            net.graph(),
            &part,
            &samples,
            PenaltyPolicy::Sentinel(SentinelWeight::Auto),
        )
        .unwrap();
        assert_eq!(eval.sentinel(), Some(6.0));
        let d = eval.distances(0);
        assert_eq!(d[1], Some(2.0));
        // 2.0 + 6.0 exceeds the cutoff, so B is not recorded at all.
        assert_eq!(d[2], None);
    }

    #[test]
    fn auto_sentinel_exceeds_large_totals() {
        for total in [0.0, 5.0, 2e16, 9.007_199_254_740_992e15, 1e300] {
            assert!(auto_sentinel(total) > total, "{total}");
        }
        assert_eq!(auto_sentinel(5.0), 6.0);
    }

    #[test]
    fn large_weights_agree_across_policies() {
        let nodes: Vec<NodeRecord> = [("S", 1), ("A", 2), ("B", 3)]
            .into_iter()
            .map(|(g, n)| NodeRecord {
                guid: g.into(),
                nwid: n,
                role: None,
            })
            .collect();
        let links = vec![
            LinkRecord {
                guid: "SA".into(),
                from: 1,
                to: 2,
                weight: 1e16,
            },
            LinkRecord {
                guid: "AB".into(),
                from: 2,
                to: 3,
                weight: 1e16,
            },
        ];
        let net = Network::build(&nodes, &links, TopologyPolicy::Relaxed).unwrap();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let samples = AllOperational { num_samples: 1 };

        for policy in [
            PenaltyPolicy::Exclude,
            PenaltyPolicy::Sentinel(SentinelWeight::Auto),
        ] {
            let eval = Evaluator::new(net.graph(), &part, &samples, policy).unwrap();
            assert_eq!(eval.evaluate(0), bitvec![1, 1], "{policy:?}");
        }
    }

    #[test]
    fn fixed_sentinel_must_exceed_total_weight() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let samples = AllOperational { num_samples: 1 };
        let err = Evaluator::new(
            net.graph(),
            &part,
            &samples,
            PenaltyPolicy::Sentinel(SentinelWeight::Fixed(5.0)),
        )
        .err()
        .unwrap();
        assert_eq!(
            err,
            EngineError::SentinelTooSmall {
                sentinel: 5.0,
                total: 5.0
            }
        );
    }

    #[test]
    fn empty_source_set_short_circuits() {
        let net = chain();
        let part = Partition::new(&net, &[], &[], TopologyPolicy::Relaxed).unwrap();
        let samples = AllOperational { num_samples: 1 };
        let eval = Evaluator::new(net.graph(), &part, &samples, PenaltyPolicy::Exclude).unwrap();
        assert_eq!(eval.evaluate(0), bitvec![0, 0, 0, 0]);
    }

    #[test]
    fn failed_source_still_counts_as_source_but_cannot_feed() {
        let net = chain();
        let part = Partition::new(&net, &[1], &[], TopologyPolicy::Relaxed).unwrap();
        let nodes = SampleTable::from_wire_rows("nodes", [("S", "0")]).unwrap();
        let samples = BoundSamples::bind(&net, Some(&nodes), None, None).unwrap();
        let eval = Evaluator::new(net.graph(), &part, &samples, PenaltyPolicy::Exclude).unwrap();
        assert_eq!(eval.evaluate(0), bitvec![0, 0, 0]);
    }
}
