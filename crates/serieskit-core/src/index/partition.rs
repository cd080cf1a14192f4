//! Partitioning of a position domain into worker chunks.

use super::PositionIter;

/// Splits `[0, len)` into at most `parallelism` contiguous inclusive bound
/// pairs. The last pair absorbs the remainder.
///
/// ```
/// use serieskit_core::index::partition_bounds;
///
/// assert_eq!(partition_bounds(12, 3), vec![(0, 3), (4, 7), (8, 11)]);
/// assert_eq!(partition_bounds(14, 3), vec![(0, 3), (4, 7), (8, 13)]);
/// ```
#[must_use]
pub fn partition_bounds(len: usize, parallelism: usize) -> Vec<(usize, usize)> {
    if len == 0 {
        return Vec::new();
    }
    let parts = parallelism.clamp(1, len);
    let size = len / parts;

    (0..parts)
        .map(|i| {
            let start = i * size;
            let end = if i + 1 == parts {
                len - 1
            } else {
                start + size - 1
            };
            (start, end)
        })
        .collect()
}

/// One worker's share of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// Contiguous inclusive position range (Uniform and Sliced indices).
    Range {
        /// First position.
        start: usize,
        /// Last position, inclusive.
        end: usize,
    },
    /// Explicit sub-list of positions, in index order (Sequential indices).
    Positions(&'a [usize]),
}

impl<'a> Chunk<'a> {
    /// Number of positions in the chunk.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Range { start, end } => end - start + 1,
            Self::Positions(p) => p.len(),
        }
    }

    /// Returns true if the chunk holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of the chunk in index order.
    #[must_use]
    pub fn iter(&self) -> PositionIter<'a> {
        match *self {
            Self::Range { start, end } => PositionIter::Range(start..end + 1),
            Self::Positions(p) => PositionIter::List(p.iter().copied()),
        }
    }
}
