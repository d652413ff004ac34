// src/error.rs

//! Error taxonomy for the prefetch pipeline.
//!
//! Every error here is fatal to the run: each pipeline step's output is a
//! precondition for the next step's correctness, so nothing is downgraded
//! to a warning and nothing is retried automatically.

use thiserror::Error;

/// Errors raised by the prefetch pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Lockfile missing, unparsable, or matching no registered format
    #[error("{0}")]
    SchemaError(String),

    /// One or more artifact transfers failed
    #[error("download failed: {0}")]
    DownloadError(String),

    /// Downloaded artifact does not match its declared size or checksum
    #[error("{0}")]
    IntegrityError(String),

    /// The `rpm` query subprocess failed or produced malformed output
    #[error("metadata extraction failed: {0}")]
    MetadataExtractionError(String),

    /// The `createrepo_c` subprocess exited non-zero
    #[error("repository build failed: {0}")]
    RepositoryBuildError(String),

    /// Filesystem operation failed
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
