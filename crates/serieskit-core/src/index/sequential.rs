//! Explicit, duplicate-free list of positions into a base.

use std::sync::OnceLock;

use super::Base;
use crate::error::{Error, Result};

/// Addresses an explicit list of positions in list order.
///
/// Containment queries use a boolean membership array of base length. The
/// checked constructor builds it while validating; the unchecked one defers
/// it to the first query. Either way it is stored in a `OnceLock`, so
/// concurrent first reads from worker threads are safe.
#[derive(Debug, Clone)]
pub struct SequentialIndex {
    base: Base,
    positions: Vec<usize>,
    membership: OnceLock<Vec<bool>>,
}

impl SequentialIndex {
    /// Creates a validated index.
    ///
    /// # Errors
    ///
    /// Returns `IllegalIndex` if a position is outside `[0, base_len)` or
    /// appears more than once.
    pub fn new(base_len: usize, positions: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; base_len];
        for &p in &positions {
            if p >= base_len {
                return Err(Error::IllegalIndex(format!(
                    "position {p} is outside base of length {base_len}"
                )));
            }
            if seen[p] {
                return Err(Error::IllegalIndex(format!("duplicate position {p}")));
            }
            seen[p] = true;
        }

        Ok(Self {
            base: Base::new(base_len),
            positions,
            membership: OnceLock::from(seen),
        })
    }

    /// Creates an index without validation.
    ///
    /// The caller guarantees every position is in bounds and unique.
    #[must_use]
    pub fn new_unchecked(base_len: usize, positions: Vec<usize>) -> Self {
        debug_assert!(positions.iter().all(|&p| p < base_len));
        Self {
            base: Base::new(base_len),
            positions,
            membership: OnceLock::new(),
        }
    }

    /// The base extent.
    #[must_use]
    pub const fn base(&self) -> Base {
        self.base
    }

    /// Positions in index order.
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Membership test for an in-bounds position.
    #[inline]
    #[must_use]
    pub fn covers(&self, position: usize) -> bool {
        self.membership()[position]
    }

    /// Returns true once the membership array has been built.
    #[must_use]
    pub fn is_membership_built(&self) -> bool {
        self.membership.get().is_some()
    }

    fn membership(&self) -> &[bool] {
        self.membership.get_or_init(|| {
            let mut seen = vec![false; self.base.len()];
            for &p in &self.positions {
                seen[p] = true;
            }
            seen
        })
    }
}
