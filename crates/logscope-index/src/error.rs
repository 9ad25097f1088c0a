//! Error types for the logscope-index crate.

use std::{io, path::PathBuf};

use tantivy::{TantivyError, query::QueryParserError};
use thiserror::Error;

/// Errors that can occur when building or searching the log index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create the index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Failed to write to the index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to the index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to append shard indexes to the main index.
    #[error("failed to merge shard indexes: {0}")]
    Merge(String),

    /// The keyword could not be turned into a query, or the query failed.
    #[error("invalid query: {0}")]
    Query(String),

    /// The folder to index or sync from does not exist.
    #[error("directory not found: {}", path.display())]
    SourceNotFound {
        /// The missing folder.
        path: PathBuf,
    },

    /// Invalid stemmer language.
    #[error("unsupported stemmer language: {0}")]
    InvalidLanguage(String),

    /// Neither the configured code page nor the encoding label is known.
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The operation was cancelled through its `CancelToken`.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Merge` error from anything displayable.
    pub(crate) fn merge(source: impl ToString) -> Self {
        Self::Merge(source.to_string())
    }

    /// Creates a `Query` error from a query parser error.
    pub(crate) fn parse(source: &QueryParserError) -> Self {
        Self::Query(source.to_string())
    }

    /// Creates a `Query` error from a failed search.
    pub(crate) fn query(source: &TantivyError) -> Self {
        Self::Query(source.to_string())
    }
}
