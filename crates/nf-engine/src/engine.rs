//! Monte Carlo driver: evaluates every sample and fills the result matrix.

use std::ops::Range;

use bitvec::prelude::*;
use nf_core::timing::Timer;
use rayon::prelude::*;

use crate::aggregate::{FunctionalityMatrix, FunctionalityResults, aggregate};
use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::reachability::{Evaluator, PenaltyPolicy};
use crate::roles::Partition;
use crate::samples::SampleProvider;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    /// Evaluate the samples of a chunk on the rayon pool.
    pub parallel: bool,
    /// Samples per chunk; progress is reported once per chunk.
    pub chunk_size: usize,
    /// Dedicated pool size. `None` uses the global rayon pool.
    pub threads: Option<usize>,
    pub penalty: PenaltyPolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 256,
            threads: None,
            penalty: PenaltyPolicy::Exclude,
        }
    }
}

impl EngineOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.chunk_size == 0 {
            return Err(EngineError::InvalidOption {
                what: "chunk_size must be positive".to_string(),
            });
        }
        if self.threads == Some(0) {
            return Err(EngineError::InvalidOption {
                what: "threads must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Samples evaluated so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineProgress {
    pub completed: usize,
    pub total: usize,
}

impl EngineProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

pub struct FunctionalityEngine<'a, P: SampleProvider> {
    network: &'a Network,
    partition: &'a Partition,
    samples: &'a P,
    options: EngineOptions,
}

impl<'a, P: SampleProvider> FunctionalityEngine<'a, P> {
    pub fn new(
        network: &'a Network,
        partition: &'a Partition,
        samples: &'a P,
        options: EngineOptions,
    ) -> Self {
        Self {
            network,
            partition,
            samples,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate every sample.
    ///
    /// Samples are processed in consecutive chunks; within a chunk they may
    /// run on any worker, but each result lands in its own sample column, so
    /// the matrix does not depend on scheduling. `progress` is called on the
    /// calling thread after every chunk.
    pub fn run(
        &self,
        mut progress: Option<&mut dyn FnMut(EngineProgress)>,
    ) -> EngineResult<FunctionalityMatrix> {
        self.options.validate()?;
        let total = self.samples.num_samples();
        if total == 0 {
            return Err(EngineError::NoSamples);
        }

        let evaluator = Evaluator::new(
            self.network.graph(),
            self.partition,
            self.samples,
            self.options.penalty,
        )?;
        let rows = self.partition.distribution().len();
        let mut matrix = FunctionalityMatrix::new(rows, total);

        let pool = match self.options.threads {
            Some(threads) if self.options.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| EngineError::InvalidOption {
                        what: format!("cannot build worker pool: {e}"),
                    })?,
            ),
            _ => None,
        };

        tracing::info!(
            samples = total,
            rows,
            sources = self.partition.sources().len(),
            parallel = self.options.parallel,
            chunk_size = self.options.chunk_size,
            sentinel = ?evaluator.sentinel(),
            "evaluating samples"
        );
        let timer = Timer::start("evaluate");

        let mut start = 0;
        while start < total {
            let end = (start + self.options.chunk_size).min(total);
            let columns = self.evaluate_chunk(&evaluator, start..end, pool.as_ref());
            for (offset, column) in columns.iter().enumerate() {
                matrix.set_column(start + offset, column)?;
            }
            tracing::debug!(completed = end, total, "chunk evaluated");
            if let Some(cb) = progress.as_mut() {
                cb(EngineProgress {
                    completed: end,
                    total,
                });
            }
            start = end;
        }

        let elapsed_s = timer.stop();
        tracing::info!(samples = total, elapsed_s, "samples evaluated");
        Ok(matrix)
    }

    /// `run` followed by aggregation into result rows.
    pub fn run_to_results(
        &self,
        progress: Option<&mut dyn FnMut(EngineProgress)>,
    ) -> EngineResult<FunctionalityResults> {
        let matrix = self.run(progress)?;
        aggregate(self.network, self.partition, &matrix)
    }

    fn evaluate_chunk(
        &self,
        evaluator: &Evaluator<'_, P>,
        samples: Range<usize>,
        pool: Option<&rayon::ThreadPool>,
    ) -> Vec<BitVec> {
        if !self.options.parallel {
            return samples.map(|s| evaluator.evaluate(s)).collect();
        }
        let work = || {
            samples
                .clone()
                .into_par_iter()
                .map(|s| evaluator.evaluate(s))
                .collect::<Vec<_>>()
        };
        match pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }
}
