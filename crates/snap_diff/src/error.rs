//! Error types for diff rendering.

/// Errors that can occur while rendering a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The changes could not be encoded as JSON.
    #[error("failed to marshal changes: {0}")]
    Json(#[from] serde_json::Error),

    /// An unrecognized output format name was given.
    #[error("unknown diff format '{0}', expected one of: label, json, pretty")]
    UnknownFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_format() {
        let err = DiffError::UnknownFormat("yaml".to_string());
        assert_eq!(
            err.to_string(),
            "unknown diff format 'yaml', expected one of: label, json, pretty"
        );
    }
}
