//! Analysis definition schema.

use std::path::PathBuf;

use nf_core::Nwid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisDef {
    pub version: u32,
    /// Prefix of the output tables (`<result_name>_failure_state`, ...).
    pub result_name: String,
    pub network: NetworkDef,
    pub analysis: AnalysisKindDef,
    #[serde(default)]
    pub engine: EngineDef,
}

impl AnalysisDef {
    /// Display name of the analysis kind.
    pub fn kind_name(&self) -> &'static str {
        match self.analysis {
            AnalysisKindDef::Epn { .. } => "epn-functionality",
            AnalysisKindDef::Wfn { .. } => "wfn-functionality",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    /// Node inventory CSV (`guid`, `nodenwid`, ...).
    pub nodes: PathBuf,
    /// Link inventory CSV (`guid`, `fromnode`, `tonode`, weight column).
    pub links: PathBuf,
    /// Link weight column; `length_km` for EPN and `length` for WFN when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_field: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum AnalysisKindDef {
    /// Electric power network.
    Epn {
        epf_sample_failure_state: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        epl_sample_failure_state: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        num_samples: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gate_station_node_list: Option<Vec<Nwid>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gate_station_node_class: Option<String>,
        /// Node column holding the facility class.
        #[serde(default = "default_class_field")]
        class_field: String,
    },
    /// Water facility network.
    Wfn {
        wf_sample_failure_state: PathBuf,
        pp_sample_failure_state: PathBuf,
        #[serde(default)]
        tank_node_list: Vec<Nwid>,
        pumpstation_node_list: Vec<Nwid>,
        /// Treat tanks as sources instead of leaving them out of both sets.
        #[serde(default)]
        tanks_are_sources: bool,
    },
}

pub const DEFAULT_GATE_STATION_CLASS: &str = "EPPL";

fn default_class_field() -> String {
    "utilfcltyc".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineDef {
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    #[serde(default)]
    pub penalty: PenaltyDef,
    /// Overrides the per-analysis default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyDef>,
}

impl Default for EngineDef {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            chunk_size: default_chunk_size(),
            threads: None,
            penalty: PenaltyDef::default(),
            topology: None,
        }
    }
}

fn default_parallel() -> bool {
    true
}

fn default_chunk_size() -> usize {
    256
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum PenaltyDef {
    #[default]
    Exclude,
    /// `weight: None` picks total network weight + 1.
    Sentinel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TopologyDef {
    Relaxed,
    Strict,
}
