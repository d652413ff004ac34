// src/resolver.rs

//! Top-level pipeline coordinator.
//!
//! Strictly sequential, no branching back: locate lockfile, parse,
//! download, verify, extract metadata. Failures from the later steps
//! propagate unchanged; only the lockfile-location and parse steps
//! produce their own errors, always naming the expected filename.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{self, FileFetcher, HttpFetcher};
use crate::lockfile::{parse_lockfile, RandomTokens, TokenSource, DEFAULT_LOCKFILE_NAME};
use crate::sbom::Component;
use crate::{metadata, repodata, verify, DEFAULT_PACKAGE_DIR};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Fetch every artifact a project's lockfile pins.
///
/// Production entry point: HTTP downloads, random internal repoid
/// tokens. Returns the SBOM components for the fetched binary packages.
pub fn fetch_rpm_source(source_dir: &Path, output_dir: &Path, config: &Config) -> Result<Vec<Component>> {
    let fetcher = HttpFetcher::new()?;
    resolve_project(source_dir, output_dir, &fetcher, &RandomTokens, config)
}

/// Run the pipeline with injectable fetcher and token source
pub fn resolve_project(
    source_dir: &Path,
    output_dir: &Path,
    fetcher: &dyn FileFetcher,
    tokens: &dyn TokenSource,
    config: &Config,
) -> Result<Vec<Component>> {
    let lockfile_path = source_dir.join(DEFAULT_LOCKFILE_NAME);
    if !lockfile_path.exists() {
        return Err(Error::SchemaError(format!(
            "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' missing, refusing to continue"
        )));
    }

    info!("reading lockfile {}", lockfile_path.display());
    let raw = fs::read_to_string(&lockfile_path)
        .map_err(|e| Error::IoError(format!("failed to read {}: {e}", lockfile_path.display())))?;
    let doc: Value = serde_yaml::from_str(&raw).map_err(|e| {
        Error::SchemaError(format!(
            "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' is not valid YAML: {e}"
        ))
    })?;
    let lock = parse_lockfile(&doc, tokens)?;

    let package_dir = output_dir.join(DEFAULT_PACKAGE_DIR);
    let downloaded = fetch::download(&lock, &package_dir, fetcher, config.concurrency_limit)?;
    verify::verify_downloaded(&downloaded)?;
    let components = metadata::build_components(&downloaded)?;

    info!(
        "fetched and verified {} artifact(s), {} SBOM component(s)",
        downloaded.len(),
        components.len()
    );
    Ok(components)
}

/// Post-fetch step: index the downloaded tree and write repo
/// configuration files pointing at `for_output_dir`
pub fn build_local_repos(from_output_dir: &Path, for_output_dir: &Path) -> Result<()> {
    repodata::generate_repos(from_output_dir)?;
    repodata::generate_repofiles(from_output_dir, for_output_dir)
}
