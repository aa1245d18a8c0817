//! Snapshot comparison and diff rendering.
//!
//! [`diff`] classifies every label in the union of two snapshots as added,
//! removed, changed or unchanged. [`DiffRenderer`] implementations turn the
//! result into a label list, a JSON array or a text table.

#![warn(missing_docs)]

pub mod differ;
pub mod error;
pub mod render;

pub use differ::{diff, diff_or_collect};
pub use error::DiffError;
pub use render::{DiffFormat, DiffRenderer, JsonRenderer, LabelRenderer, TableRenderer};
