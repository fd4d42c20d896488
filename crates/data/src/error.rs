use levsim_domain::ConfigurationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading inputs or writing results.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A row could not be parsed.
    #[error("line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Dates are not strictly increasing.
    #[error("line {line}: date {date} is not after the previous row")]
    NotChronological { line: u64, date: chrono::NaiveDate },

    /// The strategy book is unusable.
    #[error("invalid strategy book: {0}")]
    InvalidBook(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
