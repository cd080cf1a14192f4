//! Element types that can be stored in a column.

use std::cmp::Ordering;
use std::fmt::Debug;

/// A value type that can live in a [`MaskedStorage`](super::MaskedStorage).
///
/// `Default` supplies the zero fill used by freshly allocated storage; the
/// value of an undefined slot is never read as meaningful.
pub trait Element: Clone + Default + PartialEq + Debug + Send + Sync + 'static {
    /// Stable type name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Returns true if the value itself is an undefined marker (NaN).
    #[inline]
    fn is_undefined(&self) -> bool {
        false
    }

    /// Value equality used by series comparison (NaN equals NaN).
    #[inline]
    fn value_eq(&self, other: &Self) -> bool {
        self == other
    }
}

/// An element with a total order, usable as a sort key.
pub trait OrderedElement: Element {
    /// Total comparison between two defined values.
    fn compare(&self, other: &Self) -> Ordering;
}

/// A numeric element supporting the arithmetic operators.
pub trait NumericElement: OrderedElement + Copy {
    /// Additive identity.
    fn zero() -> Self;
    /// Addition (wrapping for integers).
    fn add(self, rhs: Self) -> Self;
    /// Subtraction (wrapping for integers).
    fn sub(self, rhs: Self) -> Self;
    /// Multiplication (wrapping for integers).
    fn mul(self, rhs: Self) -> Self;
    /// Division; `None` when the quotient is undefined (integer division by zero).
    fn div(self, rhs: Self) -> Option<Self>;
    /// Lossy conversion used by `mean`.
    fn to_f64(self) -> f64;
}

/// Floating point elements, whose NaN values are excluded by
/// `count_defined_excluding_nan`.
pub trait FloatElement: NumericElement {
    /// Returns true for NaN.
    fn is_nan_value(self) -> bool;
}

macro_rules! impl_integer_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const TYPE_NAME: &'static str = stringify!($t);
            }

            impl OrderedElement for $t {
                #[inline]
                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }
            }

            impl NumericElement for $t {
                #[inline]
                fn zero() -> Self {
                    0
                }
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }
                #[inline]
                fn div(self, rhs: Self) -> Option<Self> {
                    self.checked_div(rhs)
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                const TYPE_NAME: &'static str = stringify!($t);

                #[inline]
                fn is_undefined(&self) -> bool {
                    self.is_nan()
                }

                #[inline]
                fn value_eq(&self, other: &Self) -> bool {
                    self == other || (self.is_nan() && other.is_nan())
                }
            }

            /// Agrees with `value_eq`: every NaN is one value ordered above
            /// all numbers, and `-0.0` ties with `0.0`.
            impl OrderedElement for $t {
                #[inline]
                fn compare(&self, other: &Self) -> Ordering {
                    match (self.is_nan(), other.is_nan()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
                    }
                }
            }

            impl NumericElement for $t {
                #[inline]
                fn zero() -> Self {
                    0.0
                }
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }
                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }
                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }
                #[inline]
                fn div(self, rhs: Self) -> Option<Self> {
                    Some(self / rhs)
                }
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }

            impl FloatElement for $t {
                #[inline]
                fn is_nan_value(self) -> bool {
                    self.is_nan()
                }
            }
        )*
    };
}

impl_integer_element!(i32, i64, u32, u64);
impl_float_element!(f32, f64);

impl Element for bool {
    const TYPE_NAME: &'static str = "bool";
}

impl OrderedElement for bool {
    #[inline]
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Element for String {
    const TYPE_NAME: &'static str = "String";
}

impl OrderedElement for String {
    #[inline]
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}
