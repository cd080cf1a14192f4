//! Index algebra over a shared base extent.
//!
//! An [`Index`] is an immutable set of positions into a base extent of
//! length `N`, in one of three shapes:
//!
//! ```text
//! base:        0 1 2 3 4 5 6 7
//! Uniform      * * * * * * * *      every position, ascending
//! Sliced [2,5]     * * * *          contiguous range, ascending
//! Sequential   [6, 1, 3]            explicit list, list order
//! ```
//!
//! All shapes share the same contract: length, containment, lazy
//! iteration, slicing, head/tail, subset relation and partitioning. Two
//! indices are equal when they denote the same position set over bases of
//! the same length, whatever their shape.

mod partition;
mod sequential;
mod sliced;
mod uniform;

pub use partition::{partition_bounds, Chunk};
pub use sequential::SequentialIndex;
pub use sliced::SlicedIndex;
pub use uniform::UniformIndex;

use std::ops::RangeInclusive;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::series::Series;

/// The base extent every index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Base {
    len: usize,
}

impl Base {
    /// Creates a base of `len` positions.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len }
    }

    /// Number of positions in the base.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true for an empty base.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fails with `IndexBounds` if `position` is outside the base.
    pub fn check(&self, position: usize) -> Result<()> {
        if position < self.len {
            Ok(())
        } else {
            Err(Error::IndexBounds {
                position,
                base: self.len,
            })
        }
    }

    /// Fails with `BaseIndex` unless `other` has the same length.
    pub fn ensure_same(&self, other: Base) -> Result<()> {
        if self.len == other.len {
            Ok(())
        } else {
            Err(Error::BaseIndex {
                expected: self.len,
                actual: other.len,
            })
        }
    }
}

/// Subset relation of an argument index to a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum IndexRelation {
    /// The argument is not a subset of the receiver.
    NotSubset = -1,
    /// Both denote the same positions.
    Same = 0,
    /// The argument is a strict, smaller subset.
    StrictSubset = 1,
}

impl IndexRelation {
    /// The tri-state as `-1`, `0` or `1`.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        self as i8
    }
}

/// Lazy iterator over index positions.
#[derive(Debug, Clone)]
pub enum PositionIter<'a> {
    /// Ascending range.
    Range(std::ops::Range<usize>),
    /// Explicit list.
    List(std::iter::Copied<std::slice::Iter<'a, usize>>),
}

impl Iterator for PositionIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            Self::Range(r) => r.next(),
            Self::List(l) => l.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Range(r) => r.size_hint(),
            Self::List(l) => l.size_hint(),
        }
    }
}

impl DoubleEndedIterator for PositionIter<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<usize> {
        match self {
            Self::Range(r) => r.next_back(),
            Self::List(l) => l.next_back(),
        }
    }
}

impl ExactSizeIterator for PositionIter<'_> {}

/// An immutable set of positions into a base extent.
///
/// Cloning is cheap: sequential position lists are shared.
#[derive(Debug, Clone)]
pub enum Index {
    /// Every position of the base.
    Uniform(UniformIndex),
    /// A contiguous range of the base.
    Sliced(SlicedIndex),
    /// An explicit position list.
    Sequential(Arc<SequentialIndex>),
}

impl Index {
    /// Dense index over `len` positions.
    #[must_use]
    pub const fn uniform(len: usize) -> Self {
        Self::Uniform(UniformIndex::new(len))
    }

    /// Inclusive slice `[start, end]` of a base of `base_len`.
    ///
    /// # Errors
    ///
    /// See [`SlicedIndex::new`].
    pub fn sliced(base_len: usize, start: usize, end: usize) -> Result<Self> {
        SlicedIndex::new(base_len, start, end).map(Self::Sliced)
    }

    /// Validated explicit index.
    ///
    /// # Errors
    ///
    /// See [`SequentialIndex::new`].
    pub fn sequential(base_len: usize, positions: Vec<usize>) -> Result<Self> {
        SequentialIndex::new(base_len, positions).map(|s| Self::Sequential(Arc::new(s)))
    }

    /// Explicit index from positions already known to be valid.
    #[must_use]
    pub fn sequential_unchecked(base_len: usize, positions: Vec<usize>) -> Self {
        Self::Sequential(Arc::new(SequentialIndex::new_unchecked(base_len, positions)))
    }

    fn from_slice(slice: SlicedIndex) -> Self {
        if slice.start() == 0 && slice.len() == slice.base().len() {
            Self::Uniform(UniformIndex::new(slice.len()))
        } else {
            Self::Sliced(slice)
        }
    }

    /// The base extent.
    #[must_use]
    pub fn base(&self) -> Base {
        match self {
            Self::Uniform(u) => u.base(),
            Self::Sliced(s) => s.base(),
            Self::Sequential(q) => q.base(),
        }
    }

    /// Length of the base extent.
    #[must_use]
    pub fn base_len(&self) -> usize {
        self.base().len()
    }

    /// Returns true if both indices refer to bases of the same length.
    #[must_use]
    pub fn has_same_base(&self, other: &Index) -> bool {
        self.base() == other.base()
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Uniform(u) => u.len(),
            Self::Sliced(s) => s.len(),
            Self::Sequential(q) => q.len(),
        }
    }

    /// Returns true if the index holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest position, `None` when empty.
    #[must_use]
    pub fn max(&self) -> Option<usize> {
        match self {
            Self::Uniform(u) => u.len().checked_sub(1),
            Self::Sliced(s) => s.end(),
            Self::Sequential(q) => q.positions().iter().max().copied(),
        }
    }

    /// Returns true if the index covers every base position exactly once.
    #[must_use]
    pub fn is_bijective_with_base(&self) -> bool {
        match self {
            Self::Uniform(_) => true,
            Self::Sliced(s) => s.start() == 0 && s.len() == s.base().len(),
            Self::Sequential(q) => q.len() == q.base().len(),
        }
    }

    /// Membership test.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if `position` is outside the base.
    pub fn contains(&self, position: usize) -> Result<bool> {
        self.base().check(position)?;
        Ok(self.contains_unchecked(position))
    }

    /// Membership test for a position the caller knows is in bounds.
    #[inline]
    #[must_use]
    pub fn contains_unchecked(&self, position: usize) -> bool {
        match self {
            Self::Uniform(_) => true,
            Self::Sliced(s) => s.covers(position),
            Self::Sequential(q) => q.covers(position),
        }
    }

    /// Positions in index order. Each call starts a fresh iteration.
    #[must_use]
    pub fn iter(&self) -> PositionIter<'_> {
        match self {
            Self::Uniform(u) => PositionIter::Range(0..u.len()),
            Self::Sliced(s) => PositionIter::Range(s.start()..s.end_exclusive()),
            Self::Sequential(q) => PositionIter::List(q.positions().iter().copied()),
        }
    }

    /// The `k`-th position in index order.
    #[must_use]
    pub fn position_at(&self, k: usize) -> Option<usize> {
        if k >= self.len() {
            return None;
        }
        match self {
            Self::Uniform(_) => Some(k),
            Self::Sliced(s) => Some(s.start() + k),
            Self::Sequential(q) => Some(q.positions()[k]),
        }
    }

    /// Intersection with an inclusive position range.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if a non-empty range ends outside the base.
    pub fn slice_range(&self, range: RangeInclusive<usize>) -> Result<Index> {
        let (lo, hi) = (*range.start(), *range.end());
        if lo > hi {
            return Ok(Self::Sliced(SlicedIndex::empty(self.base())));
        }
        self.base().check(hi)?;

        Ok(match self {
            Self::Uniform(u) => Self::from_slice(SlicedIndex::from_bounds(u.base(), lo, hi - lo + 1)),
            Self::Sliced(s) => Self::from_slice(s.intersect(lo, hi)),
            Self::Sequential(q) => {
                let kept = q
                    .positions()
                    .iter()
                    .copied()
                    .filter(|p| (lo..=hi).contains(p))
                    .collect();
                Self::sequential_unchecked(q.base().len(), kept)
            }
        })
    }

    /// Intersection with an explicit position list, in the list's order.
    ///
    /// Repeated positions are kept once, at their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if a position is outside the base.
    pub fn slice_positions(&self, positions: &[usize]) -> Result<Index> {
        let base = self.base();
        let mut seen = FxHashSet::default();
        let mut kept = Vec::with_capacity(positions.len());
        for &p in positions {
            base.check(p)?;
            if self.contains_unchecked(p) && seen.insert(p) {
                kept.push(p);
            }
        }
        Ok(Self::sequential_unchecked(base.len(), kept))
    }

    /// Intersection with the positions where a boolean column is defined and
    /// true, in the boolean column's index order.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` if the column has a different base.
    pub fn slice_mask(&self, mask: &Series<bool>) -> Result<Index> {
        self.base().ensure_same(mask.index().base())?;
        let kept = mask
            .index()
            .iter()
            .filter(|&p| mask.value_at(p) == Some(&true) && self.contains_unchecked(p))
            .collect();
        Ok(Self::sequential_unchecked(self.base_len(), kept))
    }

    /// The first `n` positions in index order.
    #[must_use]
    pub fn head(&self, n: usize) -> Index {
        match self {
            Self::Uniform(u) if n >= u.len() => self.clone(),
            Self::Uniform(u) => Self::Sliced(SlicedIndex::from_bounds(u.base(), 0, n)),
            Self::Sliced(s) => Self::Sliced(s.head(n)),
            Self::Sequential(q) => {
                let n = n.min(q.len());
                Self::sequential_unchecked(q.base().len(), q.positions()[..n].to_vec())
            }
        }
    }

    /// The last `n` positions in index order.
    #[must_use]
    pub fn tail(&self, n: usize) -> Index {
        match self {
            Self::Uniform(u) if n >= u.len() => self.clone(),
            Self::Uniform(u) => {
                Self::Sliced(SlicedIndex::from_bounds(u.base(), u.len() - n, n))
            }
            Self::Sliced(s) => Self::Sliced(s.tail(n)),
            Self::Sequential(q) => {
                let n = n.min(q.len());
                Self::sequential_unchecked(q.base().len(), q.positions()[q.len() - n..].to_vec())
            }
        }
    }

    /// The same positions reordered ascending by position value.
    #[must_use]
    pub fn sorted_ascending(&self) -> Index {
        match self {
            Self::Sequential(q) => {
                let mut positions = q.positions().to_vec();
                positions.sort_unstable();
                Self::sequential_unchecked(q.base().len(), positions)
            }
            _ => self.clone(),
        }
    }

    /// Relation of `other` to this index: not a subset, same positions, or a
    /// strict subset.
    #[must_use]
    pub fn relation_to(&self, other: &Index) -> IndexRelation {
        if !self.has_same_base(other) {
            return IndexRelation::NotSubset;
        }

        let subset = match (self, other) {
            (Self::Uniform(_), _) => true,
            (Self::Sliced(a), Self::Sliced(b)) => {
                b.is_empty() || (b.start() >= a.start() && b.end_exclusive() <= a.end_exclusive())
            }
            _ => other.len() <= self.len() && other.iter().all(|p| self.contains_unchecked(p)),
        };

        if !subset {
            IndexRelation::NotSubset
        } else if other.len() == self.len() {
            IndexRelation::Same
        } else {
            IndexRelation::StrictSubset
        }
    }

    /// Splits the positions into at most `parallelism` disjoint chunks,
    /// contiguous in index order, whose union is the whole index.
    #[must_use]
    pub fn partitions(&self, parallelism: usize) -> Vec<Chunk<'_>> {
        let bounds = partition_bounds(self.len(), parallelism);
        match self {
            Self::Uniform(_) => bounds
                .into_iter()
                .map(|(start, end)| Chunk::Range { start, end })
                .collect(),
            Self::Sliced(s) => bounds
                .into_iter()
                .map(|(start, end)| Chunk::Range {
                    start: s.start() + start,
                    end: s.start() + end,
                })
                .collect(),
            Self::Sequential(q) => bounds
                .into_iter()
                .map(|(start, end)| Chunk::Positions(&q.positions()[start..=end]))
                .collect(),
        }
    }

    /// The whole index as a single chunk.
    #[must_use]
    pub fn whole(&self) -> Chunk<'_> {
        match self.partitions(1).pop() {
            Some(chunk) => chunk,
            None => Chunk::Positions(&[]),
        }
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.relation_to(other) == IndexRelation::Same
    }
}

impl Eq for Index {}

impl<'a> IntoIterator for &'a Index {
    type Item = usize;
    type IntoIter = PositionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
