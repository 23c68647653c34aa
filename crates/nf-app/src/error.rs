//! Error types for the nf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives front-ends a single error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Definition error: {0}")]
    Project(String),

    #[error("Definition validation failed: {0}")]
    Validation(String),

    #[error("Input file not found: {path}")]
    MissingInput { path: PathBuf },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for nf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<nf_project::ProjectError> for AppError {
    fn from(err: nf_project::ProjectError) -> Self {
        match err {
            nf_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<nf_project::ValidationError> for AppError {
    fn from(err: nf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<nf_graph::GraphError> for AppError {
    fn from(err: nf_graph::GraphError) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<nf_engine::EngineError> for AppError {
    fn from(err: nf_engine::EngineError) -> Self {
        match err {
            nf_engine::EngineError::Graph(g) => AppError::Network(g.to_string()),
            other => AppError::Engine(other.to_string()),
        }
    }
}

impl From<nf_results::ResultsError> for AppError {
    fn from(err: nf_results::ResultsError) -> Self {
        match err {
            nf_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
