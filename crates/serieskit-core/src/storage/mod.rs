//! Null-aware column storage.
//!
//! A [`MaskedStorage`] pairs a contiguous value array with an optional
//! definedness mask of equal length:
//!
//! ```text
//! values: [ 3 | 0 | -1 | 7 ]
//! mask:   [ T | F |  T | T ]   -> position 1 is undefined
//! ```
//!
//! A missing mask is the fast path meaning "every position is defined".
//! Storage is never edited after construction; operators that change
//! content allocate a new instance.

mod element;

pub use element::{Element, FloatElement, NumericElement, OrderedElement};

use crate::error::{Error, Result};

/// A value array plus an optional definedness mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedStorage<T> {
    values: Vec<T>,
    /// `mask[i] == false` marks position `i` undefined.
    mask: Option<Vec<bool>>,
}

impl<T: Element> MaskedStorage<T> {
    /// Creates fully defined storage.
    #[must_use]
    pub fn from_values(values: Vec<T>) -> Self {
        Self { values, mask: None }
    }

    /// Creates storage from a value array and an optional mask.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if the mask and value lengths differ.
    pub fn from_parts(values: Vec<T>, mask: Option<Vec<bool>>) -> Result<Self> {
        if let Some(ref m) = mask {
            if m.len() != values.len() {
                return Err(Error::LengthMismatch {
                    expected: values.len(),
                    actual: m.len(),
                });
            }
        }
        Ok(Self { values, mask })
    }

    /// Creates storage from nullable input.
    ///
    /// `None` and values that are undefined markers themselves (NaN) become
    /// undefined slots. The mask is only built if one was found.
    pub fn from_options<I>(input: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let iter = input.into_iter();
        let mut values = Vec::with_capacity(iter.size_hint().0);
        let mut mask: Option<Vec<bool>> = None;

        for (i, item) in iter.enumerate() {
            let defined = match item {
                Some(v) if !v.is_undefined() => {
                    values.push(v);
                    true
                }
                Some(v) => {
                    values.push(v);
                    false
                }
                None => {
                    values.push(T::default());
                    false
                }
            };
            if !defined && mask.is_none() {
                mask = Some(vec![true; i]);
            }
            if let Some(ref mut m) = mask {
                m.push(defined);
            }
        }

        Self { values, mask }
    }

    /// Creates storage of `len` copies of `value`.
    #[must_use]
    pub fn filled(value: T, len: usize) -> Self {
        Self::from_values(vec![value; len])
    }

    /// Creates zero-filled storage of `len` positions, all undefined.
    #[must_use]
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
            mask: Some(vec![false; len]),
        }
    }

    /// Creates zero-filled, fully defined storage of `size` positions sharing
    /// this storage's element type.
    #[must_use]
    pub fn create_same_type(&self, size: usize) -> Self {
        Self::from_values(vec![T::default(); size])
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if a mask is present.
    #[inline]
    #[must_use]
    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Raw value at `position`. The caller guarantees bounds; the slot may be
    /// undefined.
    #[inline]
    #[must_use]
    pub fn get(&self, position: usize) -> &T {
        &self.values[position]
    }

    /// Definedness of `position`. The caller guarantees bounds.
    #[inline]
    #[must_use]
    pub fn is_defined(&self, position: usize) -> bool {
        match self.mask {
            Some(ref m) => m[position],
            None => true,
        }
    }

    /// Checked access: `None` when out of bounds or undefined.
    #[must_use]
    pub fn get_checked(&self, position: usize) -> Option<&T> {
        if position < self.values.len() && self.is_defined(position) {
            Some(&self.values[position])
        } else {
            None
        }
    }

    /// The value array, including unspecified values in undefined slots.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The mask, if any.
    #[must_use]
    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// Number of undefined slots.
    #[must_use]
    pub fn undefined_count(&self) -> usize {
        self.mask
            .as_ref()
            .map_or(0, |m| m.iter().filter(|defined| !**defined).count())
    }

    /// Deep copy that drops an all-true mask.
    #[must_use]
    pub fn clone_normalized(&self) -> Self {
        self.clone().normalized()
    }

    /// Drops the mask if every slot is defined.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.mask.as_ref().is_some_and(|m| m.iter().all(|d| *d)) {
            self.mask = None;
        }
        self
    }

    /// Splits into the value array and mask.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<Vec<bool>>) {
        (self.values, self.mask)
    }
}
