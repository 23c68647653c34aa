//! nf-graph: undirected weighted network graph for netfunc.
//!
//! Provides:
//! - Core graph data structures (Vertex, Edge, Graph) in compact adjacency form
//! - Incremental graph builder with a topology policy and validation
//! - Network id <-> vertex indexing
//! - Multi-source Dijkstra with a per-call weight override
//!
//! # Example
//!
//! ```
//! use nf_graph::{GraphBuilder, multi_source_dijkstra};
//!
//! let mut builder = GraphBuilder::new();
//! let s = builder.add_node(1);
//! builder.add_node(2);
//! builder.add_edge(1, 2, 0.5).unwrap();
//! let graph = builder.build().unwrap();
//!
//! let dist = multi_source_dijkstra(&graph, &[s], |e| Some(e.weight), None);
//! assert_eq!(dist[1], Some(0.5));
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod shortest_path;
pub(crate) mod validate;

pub use builder::{GraphBuilder, TopologyPolicy};
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Graph, Vertex};
pub use indexing::NwidIndex;
pub use shortest_path::multi_source_dijkstra;
