//! Dense index addressing every position of its base.

use super::Base;

/// Addresses `0..N` in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformIndex {
    base: Base,
}

impl UniformIndex {
    /// Creates a dense index over a base of `len` positions.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            base: Base::new(len),
        }
    }

    /// The base extent.
    #[must_use]
    pub const fn base(&self) -> Base {
        self.base
    }

    /// Number of positions, always the base length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.base.len()
    }

    /// Returns true for an empty base.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base.len() == 0
    }
}
