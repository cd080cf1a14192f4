//! Typed column values.
//!
//! A [`Series`] composes shared [`MaskedStorage`] with an [`Index`] and a
//! name. A position is *defined* when the index contains it and the storage
//! mask (if any) marks it defined. Series are immutable; every
//! transformation returns a new value that may share storage with its
//! source.

mod any;
mod shared;

pub use any::{describe_value, AnySeries};
pub use shared::SharedSeries;

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::Result;
use crate::index::{Base, Index};
use crate::storage::{Element, MaskedStorage};

/// A named, indexed view over masked storage.
#[derive(Debug, Clone)]
pub struct Series<T> {
    name: String,
    storage: Arc<MaskedStorage<T>>,
    index: Index,
}

impl<T: Element> Series<T> {
    /// Creates a series from storage and an index over it.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` if the index base length differs from the
    /// storage length.
    pub fn new(
        name: impl Into<String>,
        storage: impl Into<Arc<MaskedStorage<T>>>,
        index: Index,
    ) -> Result<Self> {
        let storage = storage.into();
        Base::new(storage.len()).ensure_same(index.base())?;
        Ok(Self {
            name: name.into(),
            storage,
            index,
        })
    }

    /// Creates a uniformly indexed series over `storage`.
    pub fn from_storage(name: impl Into<String>, storage: impl Into<Arc<MaskedStorage<T>>>) -> Self {
        let storage = storage.into();
        let index = Index::uniform(storage.len());
        Self {
            name: name.into(),
            storage,
            index,
        }
    }

    /// Creates a fully defined series.
    pub fn from_values(name: impl Into<String>, values: Vec<T>) -> Self {
        Self::from_storage(name, MaskedStorage::from_values(values))
    }

    /// Creates a series from nullable input; `None` and NaN are undefined.
    pub fn from_options<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Self::from_storage(name, MaskedStorage::from_options(values))
    }

    /// Creates a series of `len` copies of `value`.
    pub fn filled(name: impl Into<String>, value: T, len: usize) -> Self {
        Self::from_storage(name, MaskedStorage::filled(value, len))
    }

    /// Name of the series.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same series under a new name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// The index.
    #[must_use]
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// The backing storage.
    #[must_use]
    pub fn storage(&self) -> &MaskedStorage<T> {
        &self.storage
    }

    /// The base extent.
    #[must_use]
    pub fn base(&self) -> Base {
        self.index.base()
    }

    /// Number of indexed positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Stable element type name for diagnostics.
    #[must_use]
    pub fn type_description(&self) -> &'static str {
        T::TYPE_NAME
    }

    /// Returns true if both series refer to bases of the same length.
    #[must_use]
    pub fn has_same_base<U: Element>(&self, other: &Series<U>) -> bool {
        self.index.has_same_base(&other.index)
    }

    /// Defined value at an in-bounds position, honoring index containment
    /// and the mask. The caller guarantees bounds.
    #[inline]
    #[must_use]
    pub fn value_at(&self, position: usize) -> Option<&T> {
        if self.index.contains_unchecked(position) && self.storage.is_defined(position) {
            Some(self.storage.get(position))
        } else {
            None
        }
    }

    /// Returns true if `position` is defined.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if `position` is outside the base.
    pub fn is_defined(&self, position: usize) -> Result<bool> {
        self.base().check(position)?;
        Ok(self.value_at(position).is_some())
    }

    /// Defined value at `position`, `None` when undefined.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if `position` is outside the base.
    pub fn get(&self, position: usize) -> Result<Option<&T>> {
        self.base().check(position)?;
        Ok(self.value_at(position))
    }

    /// Defined value at `position`, or `default`.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if `position` is outside the base.
    pub fn get_or_default(&self, position: usize, default: T) -> Result<T> {
        Ok(self.get(position)?.cloned().unwrap_or(default))
    }

    /// `(position, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&T>)> + '_ {
        self.index.iter().map(move |p| (p, self.value_at(p)))
    }

    /// Values in index order, `None` for undefined positions.
    #[must_use]
    pub fn to_options(&self) -> Vec<Option<T>> {
        self.iter().map(|(_, v)| v.cloned()).collect()
    }

    /// Returns true if every base position is indexed and defined.
    #[must_use]
    pub fn is_fully_defined(&self) -> bool {
        self.index.is_bijective_with_base() && self.storage.undefined_count() == 0
    }

    /// Same storage viewed through another index.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` if `index` has a different base.
    pub fn with_index(&self, index: Index) -> Result<Self> {
        self.base().ensure_same(index.base())?;
        Ok(Self {
            name: self.name.clone(),
            storage: Arc::clone(&self.storage),
            index,
        })
    }

    /// View of the first `n` indexed positions.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        self.reindexed(self.index.head(n))
    }

    /// View of the last `n` indexed positions.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        self.reindexed(self.index.tail(n))
    }

    /// View restricted to a position range.
    ///
    /// # Errors
    ///
    /// See [`Index::slice_range`].
    pub fn slice_range(&self, range: RangeInclusive<usize>) -> Result<Self> {
        Ok(self.reindexed(self.index.slice_range(range)?))
    }

    /// View restricted to explicit positions, in their order.
    ///
    /// # Errors
    ///
    /// See [`Index::slice_positions`].
    pub fn slice_positions(&self, positions: &[usize]) -> Result<Self> {
        Ok(self.reindexed(self.index.slice_positions(positions)?))
    }

    /// View restricted to the positions where `mask` is defined and true.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` if `mask` has a different base.
    pub fn filter(&self, mask: &Series<bool>) -> Result<Self> {
        Ok(self.reindexed(self.index.slice_mask(mask)?))
    }

    /// Value equality: same base, same defined/undefined pattern over the
    /// base, equal defined values. Name and index shape are ignored.
    #[must_use]
    pub fn value_eq(&self, other: &Series<T>) -> bool {
        if !self.has_same_base(other) {
            return false;
        }
        (0..self.base().len()).all(|p| match (self.value_at(p), other.value_at(p)) {
            (None, None) => true,
            (Some(a), Some(b)) => a.value_eq(b),
            _ => false,
        })
    }

    fn reindexed(&self, index: Index) -> Self {
        Self {
            name: self.name.clone(),
            storage: Arc::clone(&self.storage),
            index,
        }
    }
}

impl<T: Element> PartialEq for Series<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value_eq(other)
    }
}
