// src/repodata.rs

//! Local repository assembly.
//!
//! Turns the downloaded package tree into locally servable yum/dnf
//! repositories: `createrepo_c` indexes every repoid directory in place,
//! and one `.repo` configuration file per architecture points the
//! consuming package manager at the indexed directories. The `.repo`
//! layout is a byte-exact external contract.

use crate::error::{Error, Result};
use crate::DEFAULT_PACKAGE_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Reserved sub-directory holding repo configuration, never indexed
pub const REPOFILE_DIR: &str = "repos.d";

/// Name of the generated repo configuration file
pub const REPOFILE_NAME: &str = "rpmfetch.repo";

/// Trailing descriptive line for internally generated repositories
const SYNTHETIC_REPOS_NOTE: &str =
    "name=Generated repository containing all packages unaffiliated with any official repository";

/// Run `createrepo_c` over one repository directory, in place
pub fn createrepo(repoid: &str, repodir: &Path) -> Result<()> {
    info!("creating repository metadata for {repoid}");

    let output = Command::new("createrepo_c").arg(repodir).output().map_err(|e| {
        Error::RepositoryBuildError(format!(
            "failed to run createrepo_c: {e}. Is createrepo_c installed?"
        ))
    })?;

    if !output.status.success() {
        return Err(Error::RepositoryBuildError(format!(
            "createrepo_c failed for {}: {}",
            repodir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(())
}

/// Architecture sub-directories of the package tree, sorted; empty when
/// the tree does not exist yet
fn arch_dirs(package_dir: &Path) -> Result<Vec<PathBuf>> {
    if !package_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    let entries = fs::read_dir(package_dir).map_err(|e| {
        Error::IoError(format!("failed to read {}: {e}", package_dir.display()))
    })?;
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::IoError(format!("failed to read directory entry: {e}")))?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Repoid directories under one architecture, sorted, excluding the
/// reserved configuration directory
fn repo_dirs(arch_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut repos = Vec::new();
    let entries = fs::read_dir(arch_dir)
        .map_err(|e| Error::IoError(format!("failed to read {}: {e}", arch_dir.display())))?;
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::IoError(format!("failed to read directory entry: {e}")))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() && name != REPOFILE_DIR {
            repos.push((name, path));
        }
    }
    repos.sort();
    Ok(repos)
}

/// Index every repoid directory under every architecture
pub fn generate_repos(from_output_dir: &Path) -> Result<()> {
    let package_dir = from_output_dir.join(DEFAULT_PACKAGE_DIR);

    for arch_dir in arch_dirs(&package_dir)? {
        for (repoid, repodir) in repo_dirs(&arch_dir)? {
            createrepo(&repoid, &repodir)?;
        }
    }

    Ok(())
}

fn repofile_content(repos: &[(String, PathBuf)], for_output_dir: &Path, arch: &str) -> String {
    let mut content = String::new();

    for (repoid, _) in repos {
        content.push_str(&format!("[{repoid}]\n"));
        content.push_str(&format!(
            "baseurl=file://{}/{DEFAULT_PACKAGE_DIR}/{arch}/{repoid}\n",
            for_output_dir.display()
        ));
        content.push_str("gpgcheck=1\n");
    }

    if !content.is_empty() {
        content.push_str(SYNTHETIC_REPOS_NOTE);
    }

    content
}

/// Write one repo configuration file per architecture.
///
/// `from_output_dir` is where the downloaded tree lives now;
/// `for_output_dir` is the path the consuming package manager will see,
/// which every `baseurl` must point into.
pub fn generate_repofiles(from_output_dir: &Path, for_output_dir: &Path) -> Result<()> {
    let package_dir = from_output_dir.join(DEFAULT_PACKAGE_DIR);

    for arch_dir in arch_dirs(&package_dir)? {
        let arch = arch_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = repofile_content(&repo_dirs(&arch_dir)?, for_output_dir, &arch);
        if content.is_empty() {
            debug!("no repositories under {}, skipping repo file", arch_dir.display());
            continue;
        }

        let repofile_dir = arch_dir.join(REPOFILE_DIR);
        fs::create_dir_all(&repofile_dir).map_err(|e| {
            Error::IoError(format!("failed to create {}: {e}", repofile_dir.display()))
        })?;

        let repofile = repofile_dir.join(REPOFILE_NAME);
        info!("writing repo configuration to {}", repofile.display());
        fs::write(&repofile, content)
            .map_err(|e| Error::IoError(format!("failed to write {}: {e}", repofile.display())))?;
    }

    Ok(())
}
