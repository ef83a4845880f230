//! Typed failures of the catalog core. The UI and the command line wrap
//! these in `anyhow` with extra context; keeping them as enums lets callers
//! tell a rejected form apart from a disk that refused a write.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A candidate book that cannot be added to the collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required.")]
    MissingTitle,
    #[error("Author is required.")]
    MissingAuthor,
    #[error("Rating must be between 1 and 5, got {0}.")]
    RatingOutOfRange(u8),
}

/// Failures at the persistence boundary. A missing or unparseable library
/// file is not in here: both load as an empty collection.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read library file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write library file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to back up unreadable library file to {path}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize library")]
    Serialize(#[from] serde_json::Error),
}

/// An unrecognised name for a filter, sort or search field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseFieldError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
