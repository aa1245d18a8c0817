//! Error types for build tool invocation and event parsing.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced while decoding a build event stream.
///
/// Either variant is terminal: the event iterator yields it once and then ends.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A record in the stream is not valid JSON or has the wrong shape.
    #[error("error parsing build event file at line {line}, column {column}: {source}")]
    Parse {
        /// 1-based line of the failure.
        line: usize,
        /// 1-based column of the failure.
        column: usize,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The underlying reader failed.
    #[error("error reading build event file: {0}")]
    Io(#[source] std::io::Error),
}

impl EventError {
    /// Classifies a stream deserializer error, unwrapping reader failures.
    pub(crate) fn from_json(err: serde_json::Error) -> Self {
        if err.is_io() {
            EventError::Io(std::io::Error::from(err))
        } else {
            EventError::Parse {
                line: err.line(),
                column: err.column(),
                source: err,
            }
        }
    }
}

/// Errors produced while running the build tool.
#[derive(Debug, thiserror::Error)]
pub enum BazelError {
    /// No `bazel` executable was configured or found on `PATH`.
    #[error("could not locate bazel on PATH: {0}")]
    Locate(#[from] which::Error),

    /// The temporary build event file could not be created.
    #[error("failed to create temporary build event file: {0}")]
    TempFile(#[source] std::io::Error),

    /// The build tool process could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// The executable that failed to start.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The build tool exited unsuccessfully.
    #[error("bazel command `{command}` failed: {status}")]
    Failed {
        /// The arguments the build tool was run with.
        command: String,
        /// The exit status.
        status: ExitStatus,
    },
}
