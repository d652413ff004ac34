// src/verify.rs

//! Post-download integrity verification.
//!
//! Re-reads every downloaded artifact from disk and compares it against
//! the size and checksum the lockfile declared. Any mismatch is fatal:
//! there is no policy for verifying what can be verified and skipping
//! the rest.

use crate::error::{Error, Result};
use crate::fetch::FileMetadata;
use crate::hash::{hash_file, HashAlgorithm};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Verify size and checksum of every downloaded artifact.
///
/// Per artifact the checks run in order, short-circuiting on the first
/// failure: on-disk size, checksum algorithm support, content digest.
pub fn verify_downloaded(metadata: &BTreeMap<PathBuf, FileMetadata>) -> Result<()> {
    for (path, meta) in metadata {
        debug!("verifying {}", path.display());

        let actual_size = fs::metadata(path)
            .map_err(|e| Error::IoError(format!("failed to stat {}: {e}", path.display())))?
            .len();
        if actual_size != meta.size {
            return Err(Error::IntegrityError(format!(
                "Unexpected file size of {}: expected {}, got {}",
                path.display(),
                meta.size,
                actual_size
            )));
        }

        let (algorithm_name, expected_digest) = meta
            .checksum
            .split_once(':')
            .unwrap_or((meta.checksum.as_str(), ""));
        let algorithm: HashAlgorithm = algorithm_name.parse().map_err(|_| {
            Error::IntegrityError(format!("Unsupported hashing algorithm: {algorithm_name}"))
        })?;

        let actual_digest = hash_file(algorithm, path)
            .map_err(|e| Error::IoError(format!("failed to read {}: {e}", path.display())))?;
        if actual_digest != expected_digest {
            return Err(Error::IntegrityError(format!(
                "Unmatched checksum of {}: expected {expected_digest}, got {actual_digest}",
                path.display()
            )));
        }
    }

    Ok(())
}
