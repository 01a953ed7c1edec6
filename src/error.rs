//! Error types shared by every stage of the filter pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration, reading inputs, matching or writing output
#[derive(Debug, Error)]
pub enum FilterError {
    /// Required key missing or value malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// File could not be opened, read, created or written
    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not valid under the configured encoding
    #[error("Failed to decode {path:?} as {encoding}")]
    Decode { path: PathBuf, encoding: &'static str },

    /// Text contains characters the configured encoding cannot represent
    #[error("Failed to encode output for {path:?} as {encoding}")]
    Encode { path: PathBuf, encoding: &'static str },

    /// Malformed delimited data
    #[error("Invalid table data in {path:?}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Configured column is not present in the table
    #[error("Column index {index} is out of range for a table with {width} column(s)")]
    ColumnOutOfRange { index: usize, width: usize },
}

impl FilterError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
