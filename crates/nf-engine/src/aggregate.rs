//! Reduction of per-sample flags into the persisted result tables.

use bitvec::prelude::*;
use nf_core::{Real, failure_fraction};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::roles::Partition;
use crate::samples::encode_flags;

/// Dense `[distribution rows x samples]` functional flags, row-major.
///
/// Columns are written by sample index, so the fill order does not matter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalityMatrix {
    rows: usize,
    samples: usize,
    bits: BitVec,
}

impl FunctionalityMatrix {
    pub fn new(rows: usize, samples: usize) -> Self {
        Self {
            rows,
            samples,
            bits: bitvec![0; rows * samples],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Store the flags of one sample; `column` holds one bit per row.
    pub fn set_column(&mut self, sample: usize, column: &BitSlice) -> EngineResult<()> {
        if sample >= self.samples {
            return Err(nf_core::NfError::IndexOob {
                what: "sample column",
                index: sample,
                len: self.samples,
            }
            .into());
        }
        if column.len() != self.rows {
            return Err(EngineError::InvalidOption {
                what: format!(
                    "column for sample {} has {} rows, matrix has {}",
                    sample,
                    column.len(),
                    self.rows
                ),
            });
        }
        for (row, flag) in column.iter().by_vals().enumerate() {
            self.bits.set(row * self.samples + sample, flag);
        }
        Ok(())
    }

    pub fn get(&self, row: usize, sample: usize) -> bool {
        self.bits[row * self.samples + sample]
    }

    /// All sample flags of one row.
    pub fn row(&self, row: usize) -> &BitSlice {
        &self.bits[row * self.samples..(row + 1) * self.samples]
    }

    pub fn functional_count(&self, row: usize) -> usize {
        self.row(row).count_ones()
    }
}

/// `sample_failure_state` output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureStateRow {
    pub guid: String,
    pub failure: String,
}

/// `failure_probability` output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureProbabilityRow {
    pub guid: String,
    pub failure_probability: Real,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalityResults {
    pub num_samples: usize,
    pub failure_state: Vec<FailureStateRow>,
    pub failure_probability: Vec<FailureProbabilityRow>,
}

impl FunctionalityResults {
    /// Mean failure probability over all reported nodes (0 when empty).
    pub fn mean_failure_probability(&self) -> Real {
        if self.failure_probability.is_empty() {
            return 0.0;
        }
        let sum: Real = self
            .failure_probability
            .iter()
            .map(|r| r.failure_probability)
            .sum();
        sum / self.failure_probability.len() as Real
    }
}

/// Join matrix rows back to node guids.
///
/// Rows are emitted in node table order, one per guid; guids sharing a
/// vertex share its flags. Vertices synthesized for dangling link endpoints
/// have no guid and are not reported.
pub fn aggregate(
    network: &Network,
    partition: &Partition,
    matrix: &FunctionalityMatrix,
) -> EngineResult<FunctionalityResults> {
    let n = matrix.samples();
    if n == 0 {
        return Err(EngineError::NoSamples);
    }

    let mut failure_state = Vec::with_capacity(matrix.rows());
    let mut failure_probability = Vec::with_capacity(matrix.rows());

    for node in network.nodes() {
        let Some(row) = partition.row_of(node.vertex) else {
            continue;
        };
        failure_state.push(FailureStateRow {
            guid: node.guid.clone(),
            failure: encode_flags(matrix.row(row)),
        });
        failure_probability.push(FailureProbabilityRow {
            guid: node.guid.clone(),
            failure_probability: failure_fraction(matrix.functional_count(row), n)?,
        });
    }

    let unreported = partition
        .distribution()
        .iter()
        .filter(|&&v| {
            network
                .graph()
                .vertex(v)
                .is_some_and(|vertex| vertex.synthesized)
        })
        .count();
    if unreported > 0 {
        tracing::warn!(
            unreported,
            "distribution vertices without an inventory guid were left out of the results"
        );
    }

    Ok(FunctionalityResults {
        num_samples: n,
        failure_state,
        failure_probability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_columns_land_by_index() {
        let mut m = FunctionalityMatrix::new(2, 3);
        m.set_column(2, bits![1, 0]).unwrap();
        m.set_column(0, bits![1, 1]).unwrap();

        assert_eq!(m.row(0), bits![1, 0, 1]);
        assert_eq!(m.row(1), bits![1, 0, 0]);
        assert!(m.get(0, 2));
        assert!(!m.get(1, 2));
        assert_eq!(m.functional_count(0), 2);
    }

    #[test]
    fn matrix_rejects_bad_columns() {
        let mut m = FunctionalityMatrix::new(2, 3);
        assert!(m.set_column(3, bits![1, 1]).is_err());
        assert!(m.set_column(0, bits![1]).is_err());
    }

    #[test]
    fn mean_probability() {
        let results = FunctionalityResults {
            num_samples: 2,
            failure_state: vec![],
            failure_probability: vec![
                FailureProbabilityRow {
                    guid: "a".into(),
                    failure_probability: 0.5,
                },
                FailureProbabilityRow {
                    guid: "b".into(),
                    failure_probability: 1.0,
                },
            ],
        };
        assert_eq!(results.mean_failure_probability(), 0.75);
    }
}
