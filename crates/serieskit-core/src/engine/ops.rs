//! Series operators, written once against the [`Executor`] primitives.

use super::Executor;
use crate::error::{Error, Result};
use crate::index::{Chunk, Index};
use crate::series::Series;
use crate::storage::{Element, FloatElement};

/// Null-aware operators available on every executor.
///
/// Binary operators fail with `BaseIndex` before allocating any output when
/// their operands have different base extents.
pub trait SeriesOps: Executor {
    /// Element-wise transform.
    ///
    /// Positions defined in `series` get `f(value)`; undefined positions stay
    /// undefined. The result keeps the index and name of `series`.
    ///
    /// # Errors
    ///
    /// Returns `MapToNull` if `f` yields `None` for a defined position.
    fn map<T, U, F>(&self, series: &Series<T>, f: F) -> Result<Series<U>>
    where
        T: Element,
        U: Element,
        F: Fn(&T) -> Option<U> + Sync,
    {
        let storage = series.storage();
        let out = self.materialize("map", series.index(), |p| {
            if !storage.is_defined(p) {
                return Ok(None);
            }
            f(storage.get(p))
                .map(Some)
                .ok_or(Error::MapToNull { position: p })
        })?;
        Series::new(series.name(), out, series.index().clone())
    }

    /// Element-wise transform over two columns.
    ///
    /// A position of `left`'s index is eligible when `left` is defined there
    /// and `right` both indexes and defines it. Eligible positions get
    /// `f(l, r)`, the others are undefined. The result keeps `left`'s index
    /// and name.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases, `MapToNull` if `f` yields
    /// `None` for an eligible position.
    fn map2<A, B, U, F>(&self, left: &Series<A>, right: &Series<B>, f: F) -> Result<Series<U>>
    where
        A: Element,
        B: Element,
        U: Element,
        F: Fn(&A, &B) -> Option<U> + Sync,
    {
        left.base().ensure_same(right.base())?;
        let storage = left.storage();
        let out = self.materialize("map2", left.index(), |p| {
            let (true, Some(r)) = (storage.is_defined(p), right.value_at(p)) else {
                return Ok(None);
            };
            f(storage.get(p), r)
                .map(Some)
                .ok_or(Error::MapToNull { position: p })
        })?;
        Series::new(left.name(), out, left.index().clone())
    }

    /// Folds `start` across the defined values.
    ///
    /// Sequentially this is a strict left fold in index order. Partitioned,
    /// the first partition folds onto `start`, every other partition folds
    /// its own values, and the partition results are folded in partition
    /// order. `f` must therefore be associative and commutative for results
    /// to match across executors.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn aggregate<T, F>(&self, series: &Series<T>, start: T, f: F) -> Result<T>
    where
        T: Element,
        F: Fn(T, &T) -> T + Sync,
    {
        let storage = series.storage();
        let seed = &start;
        let partials = self.run_chunks("aggregate", series.index(), |partition, chunk| {
            let mut acc = (partition == 0).then(|| seed.clone());
            for p in chunk.iter() {
                if storage.is_defined(p) {
                    let v = storage.get(p);
                    acc = Some(match acc {
                        Some(a) => f(a, v),
                        None => v.clone(),
                    });
                }
            }
            Ok(acc)
        })?;

        let mut partials = partials.into_iter();
        let first = partials.next().flatten().unwrap_or_else(|| start.clone());
        Ok(partials.flatten().fold(first, |acc, partial| f(acc, &partial)))
    }

    /// Folds the defined values without a start value; `None` when there
    /// are none. Same ordering caveat as [`aggregate`](Self::aggregate).
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn reduce<T, F>(&self, series: &Series<T>, f: F) -> Result<Option<T>>
    where
        T: Element,
        F: Fn(T, &T) -> T + Sync,
    {
        let storage = series.storage();
        let partials = self.run_chunks("reduce", series.index(), |_, chunk| {
            let mut acc: Option<T> = None;
            for p in chunk.iter().filter(|&p| storage.is_defined(p)) {
                let v = storage.get(p);
                acc = Some(match acc {
                    Some(a) => f(a, v),
                    None => v.clone(),
                });
            }
            Ok(acc)
        })?;

        Ok(partials
            .into_iter()
            .flatten()
            .reduce(|acc, partial| f(acc, &partial)))
    }

    /// Number of defined positions.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn count<T: Element>(&self, series: &Series<T>) -> Result<usize> {
        let storage = series.storage();
        count_where(self, "count", series.index(), |p| storage.is_defined(p))
    }

    /// Number of defined positions holding a value other than NaN.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn count_defined_excluding_nan<T: FloatElement>(&self, series: &Series<T>) -> Result<usize> {
        let storage = series.storage();
        count_where(self, "count_defined_excluding_nan", series.index(), |p| {
            storage.is_defined(p) && !storage.get(p).is_nan_value()
        })
    }

    /// Number of defined `true` values.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn count_true(&self, series: &Series<bool>) -> Result<usize> {
        let storage = series.storage();
        count_where(self, "count_true", series.index(), |p| {
            storage.is_defined(p) && *storage.get(p)
        })
    }

    /// Number of defined `false` values.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn count_false(&self, series: &Series<bool>) -> Result<usize> {
        let storage = series.storage();
        count_where(self, "count_false", series.index(), |p| {
            storage.is_defined(p) && !*storage.get(p)
        })
    }

    /// First position, in index order, whose defined value satisfies
    /// `predicate`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn find<T, P>(&self, series: &Series<T>, predicate: P) -> Result<Option<usize>>
    where
        T: Element,
        P: Fn(&T) -> bool + Sync,
    {
        let storage = series.storage();
        let hits = self.run_chunks("find", series.index(), |_, chunk| {
            Ok(chunk
                .iter()
                .find(|&p| storage.is_defined(p) && predicate(storage.get(p))))
        })?;
        Ok(hits.into_iter().flatten().next())
    }

    /// Last position, in index order, whose defined value satisfies
    /// `predicate`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn find_last<T, P>(&self, series: &Series<T>, predicate: P) -> Result<Option<usize>>
    where
        T: Element,
        P: Fn(&T) -> bool + Sync,
    {
        let storage = series.storage();
        let hits = self.run_chunks("find_last", series.index(), |_, chunk| {
            Ok(chunk
                .iter()
                .rev()
                .find(|&p| storage.is_defined(p) && predicate(storage.get(p))))
        })?;
        Ok(hits.into_iter().rev().flatten().next())
    }

    /// First position holding `value`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn first<T: Element>(&self, series: &Series<T>, value: &T) -> Result<Option<usize>> {
        self.find(series, |v| v.value_eq(value))
    }

    /// Last position holding `value`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn last<T: Element>(&self, series: &Series<T>, value: &T) -> Result<Option<usize>> {
        self.find_last(series, |v| v.value_eq(value))
    }

    /// First position holding `true`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn first_true(&self, series: &Series<bool>) -> Result<Option<usize>> {
        self.first(series, &true)
    }

    /// Last position holding `true`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn last_true(&self, series: &Series<bool>) -> Result<Option<usize>> {
        self.last(series, &true)
    }

    /// Materializes `series` onto its full base: positions outside its index
    /// become undefined and the result is uniformly indexed. Returns the
    /// series unchanged when its index already covers the base.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn dense<T: Element>(&self, series: &Series<T>) -> Result<Series<T>> {
        if series.index().is_bijective_with_base() {
            return Ok(series.clone());
        }
        let full = Index::uniform(series.base().len());
        let out = self.materialize("dense", &full, |p| Ok(series.value_at(p).cloned()))?;
        Series::new(series.name(), out, full)
    }

    /// Coalesces two columns: `primary`'s value where defined, else
    /// `secondary`'s, else undefined. The result keeps `primary`'s index and
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn fill<T: Element>(&self, primary: &Series<T>, secondary: &Series<T>) -> Result<Series<T>> {
        primary.base().ensure_same(secondary.base())?;
        let out = self.materialize("fill", primary.index(), |p| {
            Ok(primary.value_at(p).or_else(|| secondary.value_at(p)).cloned())
        })?;
        Series::new(primary.name(), out, primary.index().clone())
    }

    /// Replaces undefined indexed positions with `value`.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn fill_with_constant<T: Element>(&self, series: &Series<T>, value: T) -> Result<Series<T>> {
        let out = self.materialize("fill_with_constant", series.index(), |p| {
            Ok(Some(series.value_at(p).unwrap_or(&value).clone()))
        })?;
        Series::new(series.name(), out, series.index().clone())
    }

    /// Replaces every undefined base position with `value`, including those
    /// outside the index; the result is fully defined and uniformly indexed.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn fill_all<T: Element>(&self, series: &Series<T>, value: T) -> Result<Series<T>> {
        let full = Index::uniform(series.base().len());
        let out = self.materialize("fill_all", &full, |p| {
            Ok(Some(series.value_at(p).unwrap_or(&value).clone()))
        })?;
        Series::new(series.name(), out, full)
    }

    /// Applies `base` over the shape of `overrides`: `base`'s value where
    /// it is defined, else `overrides`' value. The result keeps `overrides`'
    /// index and `base`'s name.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn update<T: Element>(&self, base: &Series<T>, overrides: &Series<T>) -> Result<Series<T>> {
        base.base().ensure_same(overrides.base())?;
        let out = self.materialize("update", overrides.index(), |p| {
            Ok(base.value_at(p).or_else(|| overrides.value_at(p)).cloned())
        })?;
        Series::new(base.name(), out, overrides.index().clone())
    }

    /// Concatenates columns, each in its own index order, into one
    /// uniformly indexed column whose length is the sum of their lengths.
    /// The result takes the first column's name.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn union<T: Element>(&self, columns: &[&Series<T>]) -> Result<Series<T>> {
        let mut offsets = Vec::with_capacity(columns.len());
        let mut total = 0;
        for column in columns {
            offsets.push(total);
            total += column.len();
        }

        let full = Index::uniform(total);
        let out = self.materialize("union", &full, |p| {
            let source = offsets.partition_point(|&offset| offset <= p) - 1;
            let column = columns[source];
            Ok(column
                .index()
                .position_at(p - offsets[source])
                .and_then(|q| column.value_at(q))
                .cloned())
        })?;
        let name = columns.first().map_or("", |c| c.name());
        Series::new(name, out, full)
    }

    /// Gathers explicit positions into a fresh uniformly indexed column.
    /// `None` entries become undefined slots.
    ///
    /// # Errors
    ///
    /// Returns `IndexBounds` if a position is outside the base.
    fn extract<T: Element>(&self, series: &Series<T>, positions: &[Option<usize>]) -> Result<Series<T>> {
        let base = series.base();
        for &p in positions.iter().flatten() {
            base.check(p)?;
        }

        let full = Index::uniform(positions.len());
        let out = self.materialize("extract", &full, |i| {
            Ok(positions[i].and_then(|p| series.value_at(p)).cloned())
        })?;
        Series::new(series.name(), out, full)
    }
}

impl<E: Executor + ?Sized> SeriesOps for E {}

/// Counts indexed positions satisfying `keep`.
fn count_where<E, K>(executor: &E, op: &'static str, index: &Index, keep: K) -> Result<usize>
where
    E: Executor + ?Sized,
    K: Fn(usize) -> bool + Sync,
{
    let counts = executor.run_chunks(op, index, |_, chunk: Chunk<'_>| {
        Ok(chunk.iter().filter(|&p| keep(p)).count())
    })?;
    Ok(counts.into_iter().sum())
}
