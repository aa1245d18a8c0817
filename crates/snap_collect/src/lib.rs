//! Snapshot collection.
//!
//! A [`Collector`] obtains a build event stream (by running the build or by
//! replaying a saved event file), works out which tracker file each target
//! produced, reads those files through a [`snap_cache::CacheReader`] and
//! assembles the result into a [`snap_common::Snapshot`].

#![warn(missing_docs)]

pub mod collector;
pub mod error;

pub use collector::{locate_outputs, CollectOptions, Collector, EventSource};
pub use error::CollectError;
