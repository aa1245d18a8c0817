//! Tracker digest computation.
//!
//! Runs once per build target, inside the build, to turn the target's output
//! files into a [`Tracker`](snap_common::Tracker) whose digest depends only on
//! the files' base names and contents.

#![warn(missing_docs)]

pub mod digester;
pub mod error;

pub use digester::{digest, read_inputs_file, write_tracker};
pub use error::DigestError;
