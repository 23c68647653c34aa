//! Multi-source shortest path lengths.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use nf_core::{Real, VertexId};
use ordered_float::OrderedFloat;

use crate::graph::{Edge, Graph};

/// Shortest distance from the nearest of `sources` to every vertex.
///
/// `weight` is consulted for every edge relaxation instead of the stored
/// weight, so callers can penalize or remove edges per evaluation without
/// touching the shared graph. Returning `None` makes the edge impassable.
///
/// Distances greater than `cutoff` are not recorded. Unreachable vertices
/// (and vertices beyond the cutoff) are `None`; sources are `Some(0.0)`.
/// Source ids outside the graph are ignored.
pub fn multi_source_dijkstra<W>(
    graph: &Graph,
    sources: &[VertexId],
    weight: W,
    cutoff: Option<Real>,
) -> Vec<Option<Real>>
where
    W: Fn(&Edge) -> Option<Real>,
{
    let n = graph.vertex_count();
    let mut dist: Vec<Option<Real>> = vec![None; n];
    let mut heap: BinaryHeap<Reverse<(OrderedFloat<Real>, u32)>> = BinaryHeap::new();

    for &s in sources {
        if s.idx() < n && dist[s.idx()].is_none() {
            dist[s.idx()] = Some(0.0);
            heap.push(Reverse((OrderedFloat(0.0), s.index())));
        }
    }

    let within_cutoff = |d: Real| cutoff.is_none_or(|c| d <= c);

    while let Some(Reverse((OrderedFloat(d), u))) = heap.pop() {
        let u = VertexId::from_index(u);
        if dist[u.idx()].is_some_and(|best| d > best) {
            continue;
        }
        for (edge, v) in graph.neighbors(u) {
            let Some(w) = weight(edge) else {
                continue;
            };
            let candidate = d + w;
            if !within_cutoff(candidate) {
                continue;
            }
            if dist[v.idx()].is_none_or(|current| candidate < current) {
                dist[v.idx()] = Some(candidate);
                heap.push(Reverse((OrderedFloat(candidate), v.index())));
            }
        }
    }

    dist
}
