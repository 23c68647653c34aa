//! nf-project: analysis definition file format, validation and input tables.

pub mod inventory;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};

pub use inventory::{read_links, read_nodes, read_sample_table};
pub use schema::*;
pub use validate::{LATEST_VERSION, ValidationError, validate_analysis};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("{file}: row {row}, column '{column}': bad value {value:?} ({reason})")]
    BadCell {
        file: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Sample table error: {0}")]
    Samples(#[from] nf_engine::EngineError),
}

pub fn load_yaml(path: &Path) -> ProjectResult<AnalysisDef> {
    let content = std::fs::read_to_string(path)?;
    let def: AnalysisDef = serde_yaml::from_str(&content)?;
    validate_analysis(&def)?;
    Ok(def)
}

pub fn save_yaml(path: &Path, def: &AnalysisDef) -> ProjectResult<()> {
    validate_analysis(def)?;
    let content = serde_yaml::to_string(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<AnalysisDef> {
    let content = std::fs::read_to_string(path)?;
    let def: AnalysisDef = serde_json::from_str(&content)?;
    validate_analysis(&def)?;
    Ok(def)
}

pub fn save_json(path: &Path, def: &AnalysisDef) -> ProjectResult<()> {
    validate_analysis(def)?;
    let content = serde_json::to_string_pretty(def)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a definition, picking the format from the file extension.
pub fn load_definition(path: &Path) -> ProjectResult<AnalysisDef> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_json(path),
        _ => load_yaml(path),
    }
}

/// Resolve an input path relative to the definition file's directory.
pub fn resolve_input(definition_path: &Path, input: &Path) -> PathBuf {
    if input.is_absolute() {
        return input.to_path_buf();
    }
    match definition_path.parent() {
        Some(dir) => dir.join(input),
        None => input.to_path_buf(),
    }
}
