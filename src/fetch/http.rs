// src/fetch/http.rs

//! HTTP implementation of the bounded-concurrency file fetcher.
//!
//! Downloads run on a dedicated rayon pool sized to the concurrency
//! limit. Each file streams to a temporary path and is renamed into
//! place on success, so a destination either holds a complete download
//! or nothing.

use super::FileFetcher;
use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout applied to each HTTP transfer
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Bounded-concurrency HTTP fetcher backed by a blocking reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::DownloadError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn download_one(&self, url: &str, dest: &Path) -> Result<u64> {
        debug!("downloading {} to {}", url, dest.display());

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {url}",
                response.status()
            )));
        }

        // Stream to a temporary file, then rename into place
        let temp_path = dest.with_extension("part");
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::IoError(format!("failed to create file {}: {e}", temp_path.display()))
        })?;

        let written = io::copy(&mut response, &mut file)
            .map_err(|e| Error::IoError(format!("failed to write downloaded data: {e}")))?;

        fs::rename(&temp_path, dest).map_err(|e| {
            Error::IoError(format!(
                "failed to move {} to {}: {e}",
                temp_path.display(),
                dest.display()
            ))
        })?;

        Ok(written)
    }
}

impl FileFetcher for HttpFetcher {
    fn download(&self, files: &BTreeMap<String, PathBuf>, concurrency_limit: usize) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency_limit.max(1))
            .build()
            .map_err(|e| Error::DownloadError(format!("failed to build download pool: {e}")))?;

        let progress = ProgressBar::new(files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} files")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );

        let entries: Vec<(&String, &PathBuf)> = files.iter().collect();
        let results: Vec<Result<u64>> = pool.install(|| {
            entries
                .par_iter()
                .map(|(url, dest)| {
                    let outcome = self.download_one(url.as_str(), dest.as_path());
                    if let Err(e) = &outcome {
                        warn!("download of {} failed: {}", url, e);
                    }
                    progress.inc(1);
                    outcome
                })
                .collect()
        });
        progress.finish_and_clear();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            return Err(Error::DownloadError(format!(
                "{failed} of {} downloads failed",
                files.len()
            )));
        }

        let total_bytes: u64 = results.iter().filter_map(|r| r.as_ref().ok()).sum();
        info!("downloaded {} file(s), {} bytes", files.len(), total_bytes);
        Ok(())
    }
}
