//! Error types for the reshaping pipeline.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a reshaping run.
///
/// Missing lookups and missing country/year cells are not errors; they are
/// filled with defaults or nulls by the reshaper.
#[derive(Debug, Error)]
pub enum ReshapeError {
    /// Input file does not exist.
    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    /// Input file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed JSON or CSV content.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Expected header is absent from a CSV file.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Output file could not be written.
    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

impl ReshapeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingColumn { .. })
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    /// Classify an error raised while opening or reading an input.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Classify a `csv` error raised while reading an input.
    pub(crate) fn from_csv(path: &Path, err: csv::Error) -> Self {
        if !err.is_io_error() {
            return Self::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            };
        }
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::from_io(path, source),
            kind => Self::Parse {
                path: path.to_path_buf(),
                message: format!("{kind:?}"),
            },
        }
    }
}

/// Result type for reshaping operations.
pub type Result<T> = std::result::Result<T, ReshapeError>;
