//! Result data types.

use serde::{Deserialize, Serialize};

pub use nf_engine::{FailureProbabilityRow, FailureStateRow};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    /// `epn-functionality` or `wfn-functionality`.
    pub analysis: String,
    pub result_name: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub engine_version: String,
    pub num_samples: usize,
    pub distribution_nodes: usize,
    #[serde(default)]
    pub mean_failure_probability: f64,
}

/// The two persisted output tables of a run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunTables {
    pub failure_state: Vec<FailureStateRow>,
    pub failure_probability: Vec<FailureProbabilityRow>,
}

/// Output table file names for a result name.
pub fn failure_state_file(result_name: &str) -> String {
    format!("{result_name}_failure_state.csv")
}

pub fn failure_probability_file(result_name: &str) -> String {
    format!("{result_name}_failure_probability.csv")
}
