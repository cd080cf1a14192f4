//! Contiguous sub-range of a base.

use super::Base;
use crate::error::{Error, Result};

/// Addresses the inclusive range `[start, end]` of its base in ascending
/// order. An empty slice has `len == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicedIndex {
    base: Base,
    start: usize,
    len: usize,
}

impl SlicedIndex {
    /// Creates the inclusive slice `[start, end]` of a base of `base_len`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalIndex` if `start > end`, `IndexBounds` if `end` is
    /// outside the base.
    pub fn new(base_len: usize, start: usize, end: usize) -> Result<Self> {
        let base = Base::new(base_len);
        if start > end {
            return Err(Error::IllegalIndex(format!(
                "slice start {start} is after end {end}"
            )));
        }
        base.check(end)?;
        Ok(Self::from_bounds(base, start, end - start + 1))
    }

    /// Creates a slice from a start and a length already known to fit.
    pub(crate) const fn from_bounds(base: Base, start: usize, len: usize) -> Self {
        Self { base, start, len }
    }

    /// An empty slice of `base`.
    pub(crate) const fn empty(base: Base) -> Self {
        Self::from_bounds(base, 0, 0)
    }

    /// The base extent.
    #[must_use]
    pub const fn base(&self) -> Base {
        self.base
    }

    /// First position.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Last position (inclusive), `None` when empty.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + self.len - 1)
        }
    }

    /// One past the last position.
    #[must_use]
    pub(crate) const fn end_exclusive(&self) -> usize {
        self.start + self.len
    }

    /// Number of positions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the slice holds no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Membership test for an in-bounds position.
    #[inline]
    #[must_use]
    pub const fn covers(&self, position: usize) -> bool {
        position >= self.start && position < self.end_exclusive()
    }

    /// Intersection with the inclusive range `[lo, hi]`.
    #[must_use]
    pub fn intersect(&self, lo: usize, hi: usize) -> Self {
        let lo = lo.max(self.start);
        let hi_excl = hi.saturating_add(1).min(self.end_exclusive());
        if lo >= hi_excl {
            Self::empty(self.base)
        } else {
            Self::from_bounds(self.base, lo, hi_excl - lo)
        }
    }

    /// The first `n` positions.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        Self::from_bounds(self.base, self.start, n.min(self.len))
    }

    /// The last `n` positions.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let n = n.min(self.len);
        Self::from_bounds(self.base, self.end_exclusive() - n, n)
    }
}
