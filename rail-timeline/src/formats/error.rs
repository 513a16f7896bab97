//! File format error types.

use std::path::PathBuf;

/// Errors reading or writing data files.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// File could not be opened, read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not the JSON shape expected
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// CSV could not be read or written
    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

impl FormatError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        FormatError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        FormatError::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        FormatError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
