//! Execution engine.
//!
//! Operators are written once, against the [`Executor`] primitives, and run
//! on either implementation:
//!
//! - [`SequentialExecutor`]: synchronous on the calling thread.
//! - [`PartitionedExecutor`]: one rayon task per index partition on a
//!   dedicated pool, join-all, first error in partition order.
//!
//! [`Engine`] is itself an executor that routes every primitive call to the
//! partitioned executor when the input is longer than the configured
//! threshold, and to the sequential one otherwise.
//!
//! # Architecture
//!
//! ```text
//! SeriesOps / NumericOps / SortOps      (operators, provided methods)
//!            │
//!        Executor                       (materialize, run_chunks, sort_positions)
//!        ┌───┴──────────────┐
//! SequentialExecutor  PartitionedExecutor
//! ```

mod numeric;
mod ops;
mod partitioned;
mod sequential;

pub use numeric::NumericOps;
pub use ops::SeriesOps;
pub use partitioned::PartitionedExecutor;
pub use sequential::SequentialExecutor;

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::{Chunk, Index};
use crate::storage::{Element, MaskedStorage};

/// Execution primitives shared by both executors.
///
/// Every operator is expressed through these three calls, so the two
/// implementations produce identical observable results.
pub trait Executor: Send + Sync {
    /// Short executor name for logs.
    fn label(&self) -> &'static str;

    /// Builds storage over `index.base_len()` slots: every indexed position
    /// gets `kernel(position)` (`None` = undefined), every other slot is
    /// undefined. An all-defined result drops its mask.
    ///
    /// # Errors
    ///
    /// Propagates the first kernel failure (wrapped in `ThreadFailed` when
    /// partitioned). No partial output is returned.
    fn materialize<U, K>(&self, op: &'static str, index: &Index, kernel: K) -> Result<MaskedStorage<U>>
    where
        U: Element,
        K: Fn(usize) -> Result<Option<U>> + Sync;

    /// Runs `task(partition, chunk)` over the chunks of `index` and returns
    /// the results in partition order. An empty index yields no results.
    ///
    /// # Errors
    ///
    /// Propagates the first task failure (wrapped in `ThreadFailed` when
    /// partitioned).
    fn run_chunks<R, F>(&self, op: &'static str, index: &Index, task: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize, Chunk<'_>) -> Result<R> + Sync;

    /// Stable sort of `positions` by `compare`.
    fn sort_positions<C>(&self, positions: &mut [usize], compare: C)
    where
        C: Fn(usize, usize) -> Ordering + Sync;
}

/// Collects per-partition results after every partition has finished.
///
/// The first failure in partition order wins and is wrapped in
/// `ThreadFailed`; later successes and failures are discarded.
pub(crate) fn join_partitions<R>(op: &'static str, results: Vec<Result<R>>) -> Result<Vec<R>> {
    let failed = results.iter().filter(|r| r.is_err()).count();
    let mut collected = Vec::with_capacity(results.len());

    for (partition, result) in results.into_iter().enumerate() {
        match result {
            Ok(value) => collected.push(value),
            Err(err) => {
                warn!(op, partition, failed, error = %err, "partition failed");
                return Err(err.in_partition(partition));
            }
        }
    }
    Ok(collected)
}

/// Executor that picks sequential or partitioned execution per call.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    sequential: SequentialExecutor,
    partitioned: Option<PartitionedExecutor>,
}

impl Engine {
    /// Creates an engine; builds the worker pool when `config.parallel` is set.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid or the pool cannot
    /// be built.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let partitioned = if config.parallel {
            Some(PartitionedExecutor::new(config.effective_threads())?)
        } else {
            None
        };

        debug!(
            parallel = config.parallel,
            threads = partitioned.as_ref().map_or(1, PartitionedExecutor::threads),
            min_parallel_len = config.min_parallel_len,
            "engine created"
        );

        Ok(Self {
            config,
            sequential: SequentialExecutor,
            partitioned,
        })
    }

    /// Creates an engine that always runs on the calling thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            config: EngineConfig::sequential_only(),
            sequential: SequentialExecutor,
            partitioned: None,
        }
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The sequential executor.
    #[must_use]
    pub fn sequential_executor(&self) -> &SequentialExecutor {
        &self.sequential
    }

    /// The partitioned executor, if enabled.
    #[must_use]
    pub fn partitioned_executor(&self) -> Option<&PartitionedExecutor> {
        self.partitioned.as_ref()
    }

    /// Returns the partitioned executor if an input of `len` should use it.
    fn route(&self, len: usize) -> Option<&PartitionedExecutor> {
        if self.config.should_parallelize(len) {
            self.partitioned.as_ref()
        } else {
            None
        }
    }
}

impl Executor for Engine {
    fn label(&self) -> &'static str {
        "engine"
    }

    fn materialize<U, K>(&self, op: &'static str, index: &Index, kernel: K) -> Result<MaskedStorage<U>>
    where
        U: Element,
        K: Fn(usize) -> Result<Option<U>> + Sync,
    {
        match self.route(index.len()) {
            Some(partitioned) => partitioned.materialize(op, index, kernel),
            None => self.sequential.materialize(op, index, kernel),
        }
    }

    fn run_chunks<R, F>(&self, op: &'static str, index: &Index, task: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize, Chunk<'_>) -> Result<R> + Sync,
    {
        match self.route(index.len()) {
            Some(partitioned) => partitioned.run_chunks(op, index, task),
            None => self.sequential.run_chunks(op, index, task),
        }
    }

    fn sort_positions<C>(&self, positions: &mut [usize], compare: C)
    where
        C: Fn(usize, usize) -> Ordering + Sync,
    {
        match self.route(positions.len()) {
            Some(partitioned) => partitioned.sort_positions(positions, compare),
            None => self.sequential.sort_positions(positions, compare),
        }
    }
}
