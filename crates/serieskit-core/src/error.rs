//! Error types for `serieskit`.
//!
//! Every engine failure is fail-fast: nothing is retried internally and a
//! failing call surfaces exactly one error, even under partitioned execution.
//! Error codes follow the pattern `SERIES-XXX` for easy debugging.

use thiserror::Error;

/// Result type alias for `serieskit` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `serieskit` operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed index construction (SERIES-001).
    #[error("[SERIES-001] Illegal index: {0}")]
    IllegalIndex(String),

    /// Position outside of the base extent (SERIES-002).
    #[error("[SERIES-002] Position {position} is out of bounds for base of length {base}")]
    IndexBounds {
        /// Offending position.
        position: usize,
        /// Length of the base extent.
        base: usize,
    },

    /// Columns or indices with incompatible base extents (SERIES-003).
    #[error("[SERIES-003] Base extent mismatch: expected {expected}, got {actual}")]
    BaseIndex {
        /// Base length of the receiver.
        expected: usize,
        /// Base length of the argument.
        actual: usize,
    },

    /// Column element type differs from the requested type (SERIES-004).
    #[error("[SERIES-004] Cannot cast series of {actual} to {expected}")]
    SeriesCast {
        /// Requested element type.
        expected: &'static str,
        /// Actual element type.
        actual: &'static str,
    },

    /// Substitute value type differs from the column type (SERIES-005).
    #[error("[SERIES-005] Cannot use a {actual} value with a series of {expected}")]
    ValueCast {
        /// Column element type.
        expected: &'static str,
        /// Type of the supplied value.
        actual: &'static str,
    },

    /// Map function produced no value for a defined input (SERIES-006).
    #[error("[SERIES-006] Map function returned no value for defined position {position}")]
    MapToNull {
        /// Position whose input was defined.
        position: usize,
    },

    /// A partition of a parallel call failed (SERIES-007).
    ///
    /// Wraps the first failure in partition order; the original error is
    /// kept as the source.
    #[error("[SERIES-007] Partition {partition} failed: {source}")]
    ThreadFailed {
        /// Zero-based partition number.
        partition: usize,
        /// Error raised inside the partition.
        #[source]
        source: Box<Error>,
    },

    /// Storage parts have different lengths (SERIES-008).
    #[error("[SERIES-008] Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Configuration error (SERIES-009).
    #[error("[SERIES-009] Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the error code (e.g., "SERIES-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::IllegalIndex(_) => "SERIES-001",
            Self::IndexBounds { .. } => "SERIES-002",
            Self::BaseIndex { .. } => "SERIES-003",
            Self::SeriesCast { .. } => "SERIES-004",
            Self::ValueCast { .. } => "SERIES-005",
            Self::MapToNull { .. } => "SERIES-006",
            Self::ThreadFailed { .. } => "SERIES-007",
            Self::LengthMismatch { .. } => "SERIES-008",
            Self::Config(_) => "SERIES-009",
        }
    }

    /// Returns true if this error is caused by caller input rather than by
    /// the engine setup.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.root_cause(), Self::Config(_))
    }

    /// Returns the innermost error, looking through `ThreadFailed` wrappers.
    ///
    /// Lets callers match a failure the same way whichever executor ran it.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Self::ThreadFailed { source, .. } = current {
            current = source;
        }
        current
    }

    /// Wraps `self` as the failure of `partition`.
    #[must_use]
    pub(crate) fn in_partition(self, partition: usize) -> Self {
        Self::ThreadFailed {
            partition,
            source: Box::new(self),
        }
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::Config(format!("failed to build thread pool: {err}"))
    }
}
