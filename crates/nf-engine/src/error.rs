//! Error types for the functionality engine.

use nf_core::{NfError, Nwid};
use nf_graph::GraphError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid failure string for {guid}: {reason}")]
    InvalidFailureString { guid: String, reason: String },

    #[error("Sample length mismatch in {table}: expected {expected} samples, {guid} has {actual}")]
    SampleLengthMismatch {
        table: &'static str,
        guid: String,
        expected: usize,
        actual: usize,
    },

    #[error("Sample count mismatch: {table} has {actual} samples, expected {expected}")]
    SampleCountMismatch {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("No Monte Carlo samples to evaluate")]
    NoSamples,

    #[error("Source node {nwid} is not in the network")]
    UnknownSource { nwid: Nwid },

    #[error("Sentinel weight {sentinel} does not exceed total network weight {total}")]
    SentinelTooSmall { sentinel: f64, total: f64 },

    #[error("Invalid engine option: {what}")]
    InvalidOption { what: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Numeric error: {0}")]
    Numeric(#[from] NfError),
}

pub type EngineResult<T> = Result<T, EngineError>;
