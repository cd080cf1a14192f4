//! Arithmetic operators and reductions over numeric series.

use std::cmp::Ordering;

use super::{Executor, SeriesOps};
use crate::error::Result;
use crate::series::Series;
use crate::storage::NumericElement;

/// Numeric operators, available on every executor.
///
/// Binary operators follow the masked rule of `map2`: a position is defined
/// in the result only when both operands define it. Integer arithmetic
/// wraps on overflow and integer division by zero yields an undefined slot.
pub trait NumericOps: SeriesOps {
    /// Element-wise `left + right`.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn add<T: NumericElement>(&self, left: &Series<T>, right: &Series<T>) -> Result<Series<T>> {
        binary(self, "+", left, right, |a, b| Some(NumericElement::add(a, b)))
    }

    /// Element-wise `left - right`.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn sub<T: NumericElement>(&self, left: &Series<T>, right: &Series<T>) -> Result<Series<T>> {
        binary(self, "-", left, right, |a, b| Some(NumericElement::sub(a, b)))
    }

    /// Element-wise `left * right`.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn mul<T: NumericElement>(&self, left: &Series<T>, right: &Series<T>) -> Result<Series<T>> {
        binary(self, "*", left, right, |a, b| Some(NumericElement::mul(a, b)))
    }

    /// Element-wise `left / right`.
    ///
    /// # Errors
    ///
    /// Returns `BaseIndex` on differing bases.
    fn div<T: NumericElement>(&self, left: &Series<T>, right: &Series<T>) -> Result<Series<T>> {
        binary(self, "/", left, right, NumericElement::div)
    }

    /// Sum of the defined values; zero for an empty series.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn sum<T: NumericElement>(&self, series: &Series<T>) -> Result<T> {
        self.aggregate(series, T::zero(), |acc, v| NumericElement::add(acc, *v))
    }

    /// Smallest defined value.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn min<T: NumericElement>(&self, series: &Series<T>) -> Result<Option<T>> {
        self.reduce(series, |acc, v| match v.compare(&acc) {
            Ordering::Less => *v,
            _ => acc,
        })
    }

    /// Largest defined value.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn max<T: NumericElement>(&self, series: &Series<T>) -> Result<Option<T>> {
        self.reduce(series, |acc, v| match v.compare(&acc) {
            Ordering::Greater => *v,
            _ => acc,
        })
    }

    /// Arithmetic mean of the defined values, `None` when there are none.
    ///
    /// # Errors
    ///
    /// Propagates partition failures.
    fn mean<T: NumericElement>(&self, series: &Series<T>) -> Result<Option<f64>> {
        let storage = series.storage();
        let partials = self.run_chunks("mean", series.index(), |_, chunk| {
            let mut sum = 0.0;
            let mut count = 0_usize;
            for p in chunk.iter().filter(|&p| storage.is_defined(p)) {
                sum += storage.get(p).to_f64();
                count += 1;
            }
            Ok((sum, count))
        })?;

        let (sum, count) = partials
            .into_iter()
            .fold((0.0, 0), |(s, c), (ps, pc)| (s + ps, c + pc));
        let mean = (count > 0).then(|| sum / count as f64);
        Ok(mean)
    }
}

impl<E: SeriesOps + ?Sized> NumericOps for E {}

/// Shared body of the arithmetic operators.
///
/// Unlike `map2`, an undefined quotient is a data condition and leaves the
/// slot undefined instead of failing.
fn binary<E, T, F>(
    executor: &E,
    op: &'static str,
    left: &Series<T>,
    right: &Series<T>,
    f: F,
) -> Result<Series<T>>
where
    E: Executor + ?Sized,
    T: NumericElement,
    F: Fn(T, T) -> Option<T> + Sync,
{
    left.base().ensure_same(right.base())?;
    let storage = left.storage();
    let out = executor.materialize(op, left.index(), |p| {
        if !storage.is_defined(p) {
            return Ok(None);
        }
        Ok(right.value_at(p).and_then(|r| f(*storage.get(p), *r)))
    })?;

    let name = if left.name().is_empty() || right.name().is_empty() {
        left.name().to_string()
    } else {
        format!("{}{op}{}", left.name(), right.name())
    };
    Series::new(name, out, left.index().clone())
}
