//! Shared data model for build-output snapshots.
//!
//! This crate provides the types exchanged between every other crate in the
//! workspace: the per-label [`Tracker`], the [`Snapshot`] manifest, and the
//! [`TrackerChange`] rows produced when two snapshots are compared.

#![warn(missing_docs)]

pub mod change;
pub mod snapshot;
pub mod tracker;

pub use change::{ChangeType, TrackerChange};
pub use snapshot::{Snapshot, SnapshotError};
pub use tracker::Tracker;
