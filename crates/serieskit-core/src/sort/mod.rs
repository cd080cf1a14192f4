//! Multi-key sorting of index positions.
//!
//! Sorting never touches storage: the positions of an index are reordered
//! with a stable sort and wrapped in a new Sequential index over the same
//! base. Keys may be columns of different element types; each key becomes a
//! type-erased [`PositionComparator`] and ties fall through to the next key.
//!
//! ```text
//! keys:   [ category ASC ] -> [ price DESC ] -> [ id ASC ]
//!            tie? ───────────────► tie? ──────────►
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::Executor;
use crate::error::Result;
use crate::index::{Base, Index};
use crate::series::Series;
use crate::storage::OrderedElement;

/// Sort direction and placement of undefined values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Ascending, undefined values last.
    #[default]
    Ascending,
    /// Descending, undefined values last.
    Descending,
    /// Ascending, undefined values first.
    AscendingNullsFirst,
    /// Descending, undefined values first.
    DescendingNullsFirst,
}

impl Order {
    /// Returns true for the descending variants.
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending | Self::DescendingNullsFirst)
    }

    /// Returns true if undefined values sort before defined ones.
    #[must_use]
    pub const fn nulls_first(self) -> bool {
        matches!(self, Self::AscendingNullsFirst | Self::DescendingNullsFirst)
    }
}

type CompareFn<'a> = dyn Fn(usize, usize) -> Ordering + Send + Sync + 'a;

/// Total order over positions of one base, built from one or more keys.
pub struct PositionComparator<'a> {
    compare: Box<CompareFn<'a>>,
}

impl<'a> PositionComparator<'a> {
    /// Single-key comparator over `series`.
    ///
    /// Undefined values sort after every defined value for `Ascending` and
    /// `Descending`, before them for the NullsFirst variants. Two undefined
    /// values tie.
    #[must_use]
    pub fn for_series<T: OrderedElement>(series: &'a Series<T>, order: Order) -> Self {
        let undefined_first = if order.nulls_first() {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        let descending = order.is_descending();

        Self {
            compare: Box::new(move |a, b| match (series.value_at(a), series.value_at(b)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => undefined_first,
                (Some(_), None) => undefined_first.reverse(),
                (Some(va), Some(vb)) if descending => vb.compare(va),
                (Some(va), Some(vb)) => va.compare(vb),
            }),
        }
    }

    /// Chains `next` as the tie breaker of `self`.
    #[must_use]
    pub fn then(self, next: PositionComparator<'a>) -> Self {
        let first = self.compare;
        let second = next.compare;
        Self {
            compare: Box::new(move |a, b| first(a, b).then_with(|| second(a, b))),
        }
    }

    /// Compares two positions.
    #[inline]
    #[must_use]
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        (self.compare)(a, b)
    }

    /// Strict less-than over two positions.
    #[inline]
    #[must_use]
    pub fn is_less(&self, a: usize, b: usize) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

impl fmt::Debug for PositionComparator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionComparator").finish_non_exhaustive()
    }
}

/// Ordered list of sort keys, possibly over columns of different types.
#[derive(Debug, Default)]
pub struct SortKeys<'a> {
    bases: Vec<Base>,
    comparator: Option<PositionComparator<'a>>,
}

impl<'a> SortKeys<'a> {
    /// Empty key list; sorting by it keeps the index order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `series` as the next key.
    #[must_use]
    pub fn by<T: OrderedElement>(mut self, series: &'a Series<T>, order: Order) -> Self {
        self.bases.push(series.base());
        let key = PositionComparator::for_series(series, order);
        self.comparator = Some(match self.comparator {
            Some(previous) => previous.then(key),
            None => key,
        });
        self
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns true if no key was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Sorting operators, available on every executor.
pub trait SortOps: Executor {
    /// Stable sort of the positions of `index` by `keys`.
    ///
    /// The result is a Sequential index over the same base; positions whose
    /// composite keys tie keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` if a key column has a different base.
    fn sort_index(&self, index: &Index, keys: &SortKeys<'_>) -> Result<Index> {
        for base in &keys.bases {
            index.base().ensure_same(*base)?;
        }

        let mut positions: Vec<usize> = index.iter().collect();
        if let Some(comparator) = &keys.comparator {
            self.sort_positions(&mut positions, |a, b| comparator.compare(a, b));
        }
        Ok(Index::sequential_unchecked(index.base_len(), positions))
    }

    /// `series` re-indexed in `order` of its own values. Storage is shared.
    ///
    /// # Errors
    ///
    /// Propagates index construction failures.
    fn sort<T: OrderedElement>(&self, series: &Series<T>, order: Order) -> Result<Series<T>> {
        let keys = SortKeys::new().by(series, order);
        let index = self.sort_index(series.index(), &keys)?;
        series.with_index(index)
    }
}

impl<E: Executor + ?Sized> SortOps for E {}
