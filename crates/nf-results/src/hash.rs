//! Content-based hashing for run IDs.

use std::path::Path;

use nf_project::AnalysisDef;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Hash the definition, the contents of every input table and the engine
/// version. Renaming or moving an input file keeps the id; editing it does not.
pub fn compute_run_id(
    def: &AnalysisDef,
    inputs: &[&Path],
    engine_version: &str,
) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let def_json = serde_json::to_string(def)?;
    hasher.update(def_json.as_bytes());

    for path in inputs {
        let content = std::fs::read(path)?;
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
