//! Analysis definition validation.

use std::collections::HashSet;

use crate::schema::{AnalysisDef, AnalysisKindDef, PenaltyDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing value: {field}")]
    Missing { field: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Conflicting options: {first} and {second}")]
    Conflict { first: String, second: String },

    #[error("Node {nwid} is listed as both a source and an excluded node")]
    SourceAndExcluded { nwid: i64 },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_analysis(def: &AnalysisDef) -> Result<(), ValidationError> {
    if def.version == 0 || def.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }

    if def.result_name.trim().is_empty() {
        return Err(ValidationError::Missing {
            field: "result_name".to_string(),
        });
    }
    if def.network.weight_field.as_deref().is_some_and(|f| f.trim().is_empty()) {
        return Err(ValidationError::InvalidValue {
            field: "network.weight_field".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        });
    }

    match &def.analysis {
        AnalysisKindDef::Epn {
            num_samples,
            gate_station_node_list,
            gate_station_node_class,
            class_field,
            ..
        } => {
            if gate_station_node_list.is_some() && gate_station_node_class.is_some() {
                return Err(ValidationError::Conflict {
                    first: "gate_station_node_list".to_string(),
                    second: "gate_station_node_class".to_string(),
                });
            }
            if *num_samples == Some(0) {
                return Err(ValidationError::InvalidValue {
                    field: "num_samples".to_string(),
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
            if class_field.trim().is_empty() {
                return Err(ValidationError::Missing {
                    field: "class_field".to_string(),
                });
            }
        }
        AnalysisKindDef::Wfn {
            tank_node_list,
            pumpstation_node_list,
            tanks_are_sources,
            ..
        } => {
            if !tanks_are_sources {
                let pumps: HashSet<_> = pumpstation_node_list.iter().collect();
                if let Some(&nwid) = tank_node_list.iter().find(|t| pumps.contains(t)) {
                    return Err(ValidationError::SourceAndExcluded { nwid });
                }
            }
        }
    }

    let engine = &def.engine;
    if engine.chunk_size == 0 {
        return Err(ValidationError::InvalidValue {
            field: "engine.chunk_size".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if engine.threads == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "engine.threads".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if let PenaltyDef::Sentinel {
        weight: Some(weight),
    } = engine.penalty
    {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "engine.penalty.weight".to_string(),
                value: weight.to_string(),
                reason: "must be finite and positive".to_string(),
            });
        }
    }

    Ok(())
}
