//! Type-erased series for callers that hold columns of mixed element types.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use super::Series;
use crate::engine::{Engine, SeriesOps};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::storage::Element;

/// Object-safe view of a [`Series`] of any element type.
pub trait AnySeries: Debug + Send + Sync {
    /// Name of the series.
    fn name(&self) -> &str;

    /// The index.
    fn index(&self) -> &Index;

    /// Number of indexed positions.
    fn len(&self) -> usize;

    /// Returns true if the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable element type name for diagnostics.
    fn type_description(&self) -> &'static str;

    /// Returns true if every base position is indexed and defined.
    fn is_fully_defined(&self) -> bool;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Replaces undefined positions with `value` over the full base.
    ///
    /// # Errors
    ///
    /// Returns `ValueCast` if `value` is not of the element type.
    fn fill_all_dyn(&self, engine: &Engine, value: &dyn Any) -> Result<Arc<dyn AnySeries>>;

    /// Concatenates `self` followed by `rest`.
    ///
    /// # Errors
    ///
    /// Returns `SeriesCast` if any column of `rest` has another element type.
    fn union_dyn(&self, engine: &Engine, rest: &[&dyn AnySeries]) -> Result<Arc<dyn AnySeries>>;
}

impl<T: Element> AnySeries for Series<T> {
    fn name(&self) -> &str {
        Series::name(self)
    }

    fn index(&self) -> &Index {
        Series::index(self)
    }

    fn len(&self) -> usize {
        Series::len(self)
    }

    fn type_description(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn is_fully_defined(&self) -> bool {
        Series::is_fully_defined(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn fill_all_dyn(&self, engine: &Engine, value: &dyn Any) -> Result<Arc<dyn AnySeries>> {
        let value = value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::ValueCast {
                expected: T::TYPE_NAME,
                actual: describe_value(value),
            })?;
        let filled = engine.fill_all(self, value.clone())?;
        Ok(Arc::new(filled))
    }

    fn union_dyn(&self, engine: &Engine, rest: &[&dyn AnySeries]) -> Result<Arc<dyn AnySeries>> {
        let mut columns: Vec<&Series<T>> = Vec::with_capacity(rest.len() + 1);
        columns.push(self);
        for column in rest {
            columns.push(column.downcast::<T>()?);
        }
        Ok(Arc::new(engine.union(&columns)?))
    }
}

impl<'a> dyn AnySeries + 'a {
    /// Returns true if the element type is `T`.
    #[must_use]
    pub fn is<T: Element>(&self) -> bool {
        self.as_any().is::<Series<T>>()
    }

    /// Returns true for `bool` columns.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.is::<bool>()
    }

    /// Returns true for `i32` columns.
    #[must_use]
    pub fn is_i32(&self) -> bool {
        self.is::<i32>()
    }

    /// Returns true for `i64` columns.
    #[must_use]
    pub fn is_i64(&self) -> bool {
        self.is::<i64>()
    }

    /// Returns true for `f32` columns.
    #[must_use]
    pub fn is_f32(&self) -> bool {
        self.is::<f32>()
    }

    /// Returns true for `f64` columns.
    #[must_use]
    pub fn is_f64(&self) -> bool {
        self.is::<f64>()
    }

    /// Returns true for `String` columns.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.is::<String>()
    }

    /// Checked downcast to a typed series.
    ///
    /// # Errors
    ///
    /// Returns `SeriesCast` if the element type is not `T`.
    pub fn downcast<T: Element>(&self) -> Result<&Series<T>> {
        self.as_any()
            .downcast_ref::<Series<T>>()
            .ok_or_else(|| Error::SeriesCast {
                expected: T::TYPE_NAME,
                actual: self.type_description(),
            })
    }

    /// Returns true if both columns refer to bases of the same length.
    #[must_use]
    pub fn has_same_base(&self, other: &dyn AnySeries) -> bool {
        self.index().has_same_base(other.index())
    }
}

/// Names the type of a dynamically typed value for diagnostics.
#[must_use]
pub fn describe_value(value: &dyn Any) -> &'static str {
    macro_rules! probe {
        ($($t:ty),*) => {
            $(
                if value.is::<$t>() {
                    return <$t as Element>::TYPE_NAME;
                }
            )*
        };
    }
    probe!(bool, i32, i64, u32, u64, f32, f64, String);
    if value.is::<&'static str>() {
        return "&str";
    }
    "unknown"
}
