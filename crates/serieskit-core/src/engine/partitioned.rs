//! Partitioned multi-threaded executor.
//!
//! The index is split into at most `threads` disjoint chunks; each chunk is
//! one rayon task on a dedicated pool. Output slots of different chunks
//! never overlap, so writes need no locks or atomics:
//!
//! - contiguous chunks (Uniform/Sliced) write straight into their own
//!   `split_at_mut` sub-slices of the output arrays;
//! - explicit chunks (Sequential) fill a private buffer that is scattered
//!   into the output after the join.
//!
//! The caller blocks until every task finished. A failing task does not
//! cancel its siblings; the first failure in partition order is reported.

use std::cmp::Ordering;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use super::{join_partitions, Executor};
use crate::error::Result;
use crate::index::{Chunk, Index};
use crate::storage::{Element, MaskedStorage};

/// Executor fanning out one task per partition.
#[derive(Debug)]
pub struct PartitionedExecutor {
    pool: ThreadPool,
    threads: usize,
}

impl PartitionedExecutor {
    /// Creates an executor with a pool of `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the pool cannot be built.
    pub fn new(threads: usize) -> Result<Self> {
        let threads = threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("serieskit-worker-{i}"))
            .build()?;
        Ok(Self { pool, threads })
    }

    /// Number of workers, also the maximum number of partitions.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }
}

/// A contiguous chunk together with its exclusive output window.
struct Window<'a, U> {
    partition: usize,
    start: usize,
    end: usize,
    values: &'a mut [U],
    mask: &'a mut [bool],
}

/// Cuts the output arrays into one window per contiguous chunk.
///
/// Chunks are ascending and disjoint, so successive `split_at_mut` calls
/// hand each chunk a slice nobody else can reach.
fn split_windows<'a, U>(
    mut values: &'a mut [U],
    mut mask: &'a mut [bool],
    chunks: &[Chunk<'_>],
) -> Vec<Window<'a, U>> {
    let mut offset = 0;
    let mut windows = Vec::with_capacity(chunks.len());

    for (partition, chunk) in chunks.iter().enumerate() {
        let Chunk::Range { start, end } = *chunk else {
            continue;
        };
        let (_, rest_values) = std::mem::take(&mut values).split_at_mut(start - offset);
        let (_, rest_mask) = std::mem::take(&mut mask).split_at_mut(start - offset);
        let (own_values, tail_values) = rest_values.split_at_mut(end - start + 1);
        let (own_mask, tail_mask) = rest_mask.split_at_mut(end - start + 1);

        windows.push(Window {
            partition,
            start,
            end,
            values: own_values,
            mask: own_mask,
        });
        values = tail_values;
        mask = tail_mask;
        offset = end + 1;
    }
    windows
}

impl Executor for PartitionedExecutor {
    fn label(&self) -> &'static str {
        "partitioned"
    }

    fn materialize<U, K>(&self, op: &'static str, index: &Index, kernel: K) -> Result<MaskedStorage<U>>
    where
        U: Element,
        K: Fn(usize) -> Result<Option<U>> + Sync,
    {
        let chunks = index.partitions(self.threads);
        debug!(op, len = index.len(), partitions = chunks.len(), "materialize partitioned");

        let n = index.base_len();
        let mut values = vec![U::default(); n];
        let mut mask = vec![false; n];

        if matches!(index, Index::Sequential(_)) {
            let results: Vec<Result<Vec<(usize, U)>>> = self.pool.install(|| {
                chunks
                    .par_iter()
                    .enumerate()
                    .map(|(partition, chunk)| {
                        trace!(op, partition, len = chunk.len(), "partition started");
                        let mut buffer = Vec::with_capacity(chunk.len());
                        for p in chunk.iter() {
                            if let Some(v) = kernel(p)? {
                                buffer.push((p, v));
                            }
                        }
                        Ok(buffer)
                    })
                    .collect()
            });

            for buffer in join_partitions(op, results)? {
                for (p, v) in buffer {
                    values[p] = v;
                    mask[p] = true;
                }
            }
        } else {
            let windows = split_windows(&mut values, &mut mask, &chunks);
            let results: Vec<Result<()>> = self.pool.install(|| {
                windows
                    .into_par_iter()
                    .map(|Window { partition, start, end, values, mask }| {
                        trace!(op, partition, "partition started");
                        for p in start..=end {
                            if let Some(v) = kernel(p)? {
                                values[p - start] = v;
                                mask[p - start] = true;
                            }
                        }
                        Ok(())
                    })
                    .collect()
            });
            join_partitions(op, results)?;
        }

        MaskedStorage::from_parts(values, Some(mask)).map(MaskedStorage::normalized)
    }

    fn run_chunks<R, F>(&self, op: &'static str, index: &Index, task: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize, Chunk<'_>) -> Result<R> + Sync,
    {
        let chunks = index.partitions(self.threads);
        debug!(op, len = index.len(), partitions = chunks.len(), "run partitioned");

        let results: Vec<Result<R>> = self.pool.install(|| {
            chunks
                .into_par_iter()
                .enumerate()
                .map(|(partition, chunk)| {
                    trace!(op, partition, len = chunk.len(), "partition started");
                    task(partition, chunk)
                })
                .collect()
        });
        join_partitions(op, results)
    }

    fn sort_positions<C>(&self, positions: &mut [usize], compare: C)
    where
        C: Fn(usize, usize) -> Ordering + Sync,
    {
        debug!(len = positions.len(), "sort partitioned");
        self.pool
            .install(|| positions.par_sort_by(|&a, &b| compare(a, b)));
    }
}
