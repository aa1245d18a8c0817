//! Build tool integration: invoking `bazel build`, decoding its build event
//! stream, and resolving the named file sets the events refer to.
//!
//! Only the slice of the build event protocol needed to find each target's
//! output files is modelled; every other event kind decodes to
//! [`BuildEvent::Other`].

#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod events;
pub mod fileset;

pub use client::BazelClient;
pub use error::{BazelError, EventError};
pub use events::{
    parse_build_events, BuildEvent, BuildEvents, FileSetRef, NamedFile, NamedSetOfFiles,
    OutputGroup,
};
pub use fileset::{FileSets, ResolveFiles};
