//! Error types for digest computation.

use std::path::PathBuf;

/// Errors that can occur while digesting input files or writing a tracker.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// An input file could not be opened or read.
    #[error("failed to digest {path}: {source}")]
    Read {
        /// The input path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The tracker file could not be written.
    #[error("failed to write tracker to {path}: {source}")]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The tracker could not be rendered as JSON.
    #[error("failed to render tracker json: {0}")]
    Render(#[from] serde_json::Error),

    /// No input paths were given.
    #[error("need at least one path to digest")]
    NoInputs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display() {
        let err = DigestError::Read {
            path: PathBuf::from("bazel-out/app.tar"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to digest"));
        assert!(msg.contains("app.tar"));
    }

    #[test]
    fn write_error_display() {
        let err = DigestError::Write {
            path: PathBuf::from("out/tracker.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("tracker.json"));
    }

    #[test]
    fn no_inputs_display() {
        assert_eq!(
            DigestError::NoInputs.to_string(),
            "need at least one path to digest"
        );
    }
}
