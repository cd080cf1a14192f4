//! Single-threaded executor.

use std::cmp::Ordering;

use super::Executor;
use crate::error::Result;
use crate::index::{Chunk, Index};
use crate::storage::{Element, MaskedStorage};

/// Runs every primitive synchronously on the calling thread, in index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn label(&self) -> &'static str {
        "sequential"
    }

    fn materialize<U, K>(&self, _op: &'static str, index: &Index, kernel: K) -> Result<MaskedStorage<U>>
    where
        U: Element,
        K: Fn(usize) -> Result<Option<U>> + Sync,
    {
        let n = index.base_len();
        let mut values = vec![U::default(); n];
        let mut mask = vec![false; n];

        for p in index.iter() {
            if let Some(v) = kernel(p)? {
                values[p] = v;
                mask[p] = true;
            }
        }

        MaskedStorage::from_parts(values, Some(mask)).map(MaskedStorage::normalized)
    }

    fn run_chunks<R, F>(&self, _op: &'static str, index: &Index, task: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize, Chunk<'_>) -> Result<R> + Sync,
    {
        if index.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![task(0, index.whole())?])
    }

    fn sort_positions<C>(&self, positions: &mut [usize], compare: C)
    where
        C: Fn(usize, usize) -> Ordering + Sync,
    {
        positions.sort_by(|&a, &b| compare(a, b));
    }
}
