//! Network functionality engine.
//!
//! Given a network graph, a set of source nodes and per-sample operational
//! states of nodes and links, this crate decides for every Monte Carlo sample
//! which distribution nodes are still connected to a source, and reduces the
//! per-sample flags into failure-state strings and failure probabilities.
//!
//! The same engine backs the electric power and water facility network
//! analyses; they differ only in how sources are chosen and which sample
//! tables are supplied.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod network;
pub mod reachability;
pub mod roles;
pub mod samples;

pub use aggregate::{
    FailureProbabilityRow, FailureStateRow, FunctionalityMatrix, FunctionalityResults, aggregate,
};
pub use engine::{EngineOptions, EngineProgress, FunctionalityEngine};
pub use error::{EngineError, EngineResult};
pub use network::{LinkRecord, Network, NodeRecord};
pub use reachability::{Evaluator, PenaltyPolicy, SentinelWeight};
pub use roles::{Partition, SourceSelector};
pub use samples::{
    AllOperational, BoundSamples, SampleProvider, SampleTable, encode_flags, parse_failure_string,
};
