//! Analysis definition loading and checks.

use std::path::Path;

use nf_engine::SourceSelector;
use nf_project::AnalysisDef;

use crate::analysis::{AnalysisInputs, AnalysisPlan};
use crate::error::{AppError, AppResult};

/// Load and validate an analysis definition (YAML, or JSON by extension).
pub fn load_definition(path: &Path) -> AppResult<AnalysisDef> {
    if !path.is_file() {
        return Err(AppError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    Ok(nf_project::load_definition(path)?)
}

/// What a definition resolves to, for display.
#[derive(Debug, Clone)]
pub struct DefinitionSummary {
    pub result_name: String,
    pub analysis: &'static str,
    pub inputs: AnalysisInputs,
    pub plan: AnalysisPlan,
    /// Number of explicit source ids; 0 when sources come from a class filter.
    pub source_count: usize,
    pub excluded_count: usize,
}

/// Load a definition, check that every input file exists and summarize it.
pub fn check_definition(path: &Path) -> AppResult<DefinitionSummary> {
    let def = load_definition(path)?;
    let inputs = AnalysisInputs::resolve(&def, path);
    inputs.ensure_exist()?;
    let plan = AnalysisPlan::from_definition(&def);

    let source_count = match &plan.sources {
        SourceSelector::Nodes(ids) => ids.len(),
        SourceSelector::RoleClass(_) => 0,
    };

    Ok(DefinitionSummary {
        result_name: def.result_name.clone(),
        analysis: def.kind_name(),
        excluded_count: plan.excluded.len(),
        source_count,
        inputs,
        plan,
    })
}
