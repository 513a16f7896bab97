//! Policy table error types.

use std::path::PathBuf;

/// Errors loading a policy table.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The table file could not be read
    #[error("failed to read policy table {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The table is not valid JSON for a list of entries
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The same state appears more than once
    #[error("duplicate policy state {0}")]
    DuplicateState(String),

    /// A score is NaN or infinite
    #[error("non-finite score for policy state {0}")]
    NonFiniteScore(String),
}
