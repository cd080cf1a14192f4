//! # `serieskit` Core
//!
//! Null-aware columnar series with a composable index algebra and a
//! sequential/partitioned execution engine.
//!
//! A [`Series`] is a named view over shared [`MaskedStorage`] through an
//! [`Index`]. Operators never edit a series in place: they read their
//! operands and build new storage, either on the calling thread or split
//! across a dedicated rayon pool once the input is long enough.
//!
//! ## Features
//!
//! - **Masked storage**: one value array plus an optional definedness mask
//! - **Index algebra**: Uniform, Sliced and Sequential views over one base
//! - **Two executors**: identical results sequentially or partitioned
//! - **Multi-key sort**: stable, per-key direction and null placement
//! - **Rebindable handles**: lock-free snapshots via [`SharedSeries`]
//!
//! ## Quick Start
//!
//! ```rust
//! use serieskit_core::prelude::*;
//!
//! # fn main() -> serieskit_core::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//!
//! let a = Series::from_options("a", [Some(3), None, Some(-1), Some(7)]);
//! let b = Series::from_options("b", [Some(2), Some(3), Some(2), None]);
//!
//! let total = engine.add(&a, &b)?;
//! assert_eq!(total.name(), "a+b");
//! assert_eq!(total.to_options(), vec![Some(5), None, Some(1), None]);
//!
//! let sorted = engine.sort(&a, Order::Ascending)?;
//! assert_eq!(sorted.to_options(), vec![Some(-1), Some(3), Some(7), None]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // mean() over integer counts
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod engine;
#[cfg(test)]
mod engine_tests;
pub mod error;
pub mod index;
#[cfg(test)]
mod index_tests;
pub mod series;
pub mod sort;
pub mod storage;

pub use config::{ConfigError, EngineConfig, ThreadConfig};
pub use engine::{
    Engine, Executor, NumericOps, PartitionedExecutor, SequentialExecutor, SeriesOps,
};
pub use error::{Error, Result};
pub use index::{Base, Index, IndexRelation};
pub use series::{AnySeries, Series, SharedSeries};
pub use sort::{Order, PositionComparator, SortKeys, SortOps};
pub use storage::{Element, FloatElement, MaskedStorage, NumericElement, OrderedElement};

/// Everything needed to build series and run operators.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{Engine, Executor, NumericOps, SeriesOps};
    pub use crate::error::{Error, Result};
    pub use crate::index::Index;
    pub use crate::series::{AnySeries, Series, SharedSeries};
    pub use crate::sort::{Order, SortKeys, SortOps};
    pub use crate::storage::MaskedStorage;
}
