//! Atomically rebindable handle to a series.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::Series;
use crate::storage::Element;

/// A shared slot holding the current version of a series.
///
/// Mutation is a rebind: a new series replaces the old one atomically, and
/// readers that already loaded the previous version keep a consistent,
/// unchanged value. Published series are never edited in place.
#[derive(Debug)]
pub struct SharedSeries<T> {
    current: ArcSwap<Series<T>>,
}

impl<T: Element> SharedSeries<T> {
    /// Creates a slot holding `series`.
    #[must_use]
    pub fn new(series: Series<T>) -> Self {
        Self {
            current: ArcSwap::from_pointee(series),
        }
    }

    /// Snapshot of the current series.
    #[must_use]
    pub fn load(&self) -> Arc<Series<T>> {
        self.current.load_full()
    }

    /// Replaces the current series, returning the previous one.
    pub fn rebind(&self, series: Series<T>) -> Arc<Series<T>> {
        self.current.swap(Arc::new(series))
    }

    /// Replaces the current series with `f(current)`, returning the series
    /// that was replaced.
    ///
    /// `f` may run more than once if another writer rebinds concurrently.
    pub fn update<F>(&self, f: F) -> Arc<Series<T>>
    where
        F: Fn(&Series<T>) -> Series<T>,
    {
        self.current.rcu(|current| Arc::new(f(current)))
    }
}

impl<T: Element> From<Series<T>> for SharedSeries<T> {
    fn from(series: Series<T>) -> Self {
        Self::new(series)
    }
}
