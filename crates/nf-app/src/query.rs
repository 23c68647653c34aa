//! Query helpers for loaded runs.

use nf_results::{FailureProbabilityRow, RunTables};

use crate::error::{AppError, AppResult};

/// Headline numbers of a run's failure probability table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub node_count: usize,
    pub mean_failure_probability: f64,
    pub always_functional: usize,
    pub never_functional: usize,
}

/// A run with no distribution nodes has an all-zero summary.
pub fn get_run_summary(tables: &RunTables) -> AppResult<RunSummary> {
    let rows = &tables.failure_probability;
    if rows.is_empty() {
        return Ok(RunSummary {
            node_count: 0,
            mean_failure_probability: 0.0,
            always_functional: 0,
            never_functional: 0,
        });
    }

    let sum: f64 = rows.iter().map(|r| r.failure_probability).sum();
    Ok(RunSummary {
        node_count: rows.len(),
        mean_failure_probability: sum / rows.len() as f64,
        always_functional: rows.iter().filter(|r| r.failure_probability == 0.0).count(),
        never_functional: rows.iter().filter(|r| r.failure_probability == 1.0).count(),
    })
}

/// The `n` nodes most likely to fail; ties keep table order.
pub fn top_failures(tables: &RunTables, n: usize) -> Vec<FailureProbabilityRow> {
    let mut rows = tables.failure_probability.clone();
    rows.sort_by(|a, b| b.failure_probability.total_cmp(&a.failure_probability));
    rows.truncate(n);
    rows
}

/// Failure flags of one node, decoded from its failure string.
pub fn node_failure_flags(tables: &RunTables, guid: &str) -> AppResult<Vec<bool>> {
    let row = tables
        .failure_state
        .iter()
        .find(|r| r.guid == guid)
        .ok_or_else(|| AppError::InvalidInput(format!("No node {guid} in run")))?;
    let bits = nf_engine::parse_failure_string(&row.guid, &row.failure)?;
    Ok(bits.iter().by_vals().collect())
}
