//! Shared application service layer for netfunc.
//!
//! Front-ends go through this crate to load analysis definitions, run the
//! EPN and WFN functionality analyses with caching, and query stored runs.

pub mod analysis;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;

pub use analysis::{AnalysisInputs, AnalysisPlan, LoadedInputs, PreparedAnalysis, read_inputs};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{DefinitionSummary, check_definition, load_definition};
pub use query::{RunSummary, get_run_summary, node_failure_flags, top_failures};
pub use run_service::{
    ENGINE_VERSION, RunOptions, RunRequest, RunResponse, RunTimingSummary, ensure_run,
    ensure_run_with_progress, list_runs, load_run,
};
