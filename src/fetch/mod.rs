// src/fetch/mod.rs

//! Fetch orchestration: destination planning and download sequencing.
//!
//! Planning is pure: every package entry maps to a deterministic path
//! `<package_dir>/<arch>/<repoid>/<basename>`, with the lockfile's
//! internal repoid standing in when an entry names no upstream
//! repository. Re-planning an unchanged lockfile yields identical paths.
//!
//! Downloads run one (architecture, kind) batch at a time; concurrency
//! exists only inside a batch, bounded by the configured limit. Any
//! failed transfer aborts the run.

mod http;

pub use http::HttpFetcher;

use crate::error::{Error, Result};
use crate::lockfile::{Lockfile, DEFAULT_LOCKFILE_NAME};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Whether an artifact is an installable binary package or a source package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Package,
    Source,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package => write!(f, "package"),
            Self::Source => write!(f, "source"),
        }
    }
}

/// Lockfile fields carried alongside a downloaded file for the
/// verification and SBOM steps. Rebuilt every run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub url: String,
    pub checksum: String,
    pub size: u64,
    /// True for binary packages, false for source artifacts
    pub binary: bool,
}

/// One artifact with its resolved destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub url: String,
    pub dest: PathBuf,
    pub checksum: String,
    pub size: u64,
    pub kind: ArtifactKind,
}

/// All artifacts of one (architecture, kind) partition
#[derive(Debug, Clone)]
pub struct FetchBatch {
    pub arch: String,
    pub kind: ArtifactKind,
    pub files: Vec<PlannedFile>,
}

impl FetchBatch {
    /// Remote URL to local destination mapping for the fetcher
    pub fn url_map(&self) -> BTreeMap<String, PathBuf> {
        self.files
            .iter()
            .map(|file| (file.url.clone(), file.dest.clone()))
            .collect()
    }
}

/// Bounded-concurrency file fetcher.
///
/// Implementations download every URL in the mapping to its destination
/// path and return an error if any transfer failed. Parent directories
/// of every destination exist before this is called.
pub trait FileFetcher {
    fn download(&self, files: &BTreeMap<String, PathBuf>, concurrency_limit: usize) -> Result<()>;
}

fn file_name_of(url: &str) -> Result<&str> {
    let name = url.rsplit('/').next().unwrap_or("");
    if name.is_empty() {
        return Err(Error::SchemaError(format!(
            "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' contains a package URL with no file name: {url}"
        )));
    }
    Ok(name)
}

/// Compute the fetch batches for a lockfile.
///
/// Pure except for no side effects at all: directory creation happens in
/// [`download`]. Rejects lockfiles where two entries collide on disk.
pub fn plan(lock: &Lockfile, package_dir: &Path) -> Result<Vec<FetchBatch>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut batches = Vec::new();

    for group in &lock.arches {
        let partitions = [
            (ArtifactKind::Package, &group.packages),
            (ArtifactKind::Source, &group.sources),
        ];

        for (kind, packages) in partitions {
            let mut files = Vec::with_capacity(packages.len());

            for pkg in packages {
                let repoid = match &pkg.repoid {
                    Some(id) => id.as_str(),
                    None => match kind {
                        ArtifactKind::Package => lock.internal_repoid(),
                        ArtifactKind::Source => lock.internal_source_repoid(),
                    },
                };

                let dest = package_dir
                    .join(&group.arch)
                    .join(repoid)
                    .join(file_name_of(&pkg.url)?);

                if !seen.insert(dest.clone()) {
                    return Err(Error::SchemaError(format!(
                        "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' maps two artifacts to the same path: {}",
                        dest.display()
                    )));
                }

                files.push(PlannedFile {
                    url: pkg.url.clone(),
                    dest,
                    checksum: pkg.checksum.clone(),
                    size: pkg.size,
                    kind,
                });
            }

            if !files.is_empty() {
                batches.push(FetchBatch {
                    arch: group.arch.clone(),
                    kind,
                    files,
                });
            }
        }
    }

    Ok(batches)
}

/// Download every artifact the lockfile names.
///
/// Batches run strictly sequentially; a batch's downloads must all have
/// completed or failed before the next batch starts. Returns the
/// downloaded-file metadata map consumed by verification and SBOM
/// generation.
pub fn download(
    lock: &Lockfile,
    package_dir: &Path,
    fetcher: &dyn FileFetcher,
    concurrency_limit: usize,
) -> Result<BTreeMap<PathBuf, FileMetadata>> {
    let batches = plan(lock, package_dir)?;
    let mut metadata = BTreeMap::new();

    for batch in &batches {
        for file in &batch.files {
            if let Some(parent) = file.dest.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::IoError(format!(
                        "failed to create directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        info!(
            "downloading {} {} artifact(s) for {}",
            batch.files.len(),
            batch.kind,
            batch.arch
        );
        fetcher.download(&batch.url_map(), concurrency_limit)?;

        for file in &batch.files {
            metadata.insert(
                file.dest.clone(),
                FileMetadata {
                    url: file.url.clone(),
                    checksum: file.checksum.clone(),
                    size: file.size,
                    binary: file.kind == ArtifactKind::Package,
                },
            );
        }
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lockfile::{parse_lockfile, TokenSource};
    use std::path::Path;

    struct FixedTokens(&'static str);

    impl TokenSource for FixedTokens {
        fn token(&self, len: usize) -> String {
            self.0[..len.min(self.0.len())].to_string()
        }
    }

    fn parse(raw: &str) -> Lockfile {
        let doc = serde_yaml::from_str(raw).unwrap();
        parse_lockfile(&doc, &FixedTokens("abcdef")).unwrap()
    }

    const VIM_LOCKFILE: &str = "
lockfileVersion: 1
lockfileVendor: redhat
arches:
  - arch: x86_64
    packages:
      - url: https://example.com/x86_64/Packages/v/vim-enhanced-9.1.158-1.fc38.x86_64.rpm
        checksum: sha256:21bb2a09852e75a693d277435c162e1a910835c53c3cee7636dd552d450ed0f1
        size: 1976132
        repoid: updates
    source:
      - url: https://example.com/source/tree/Packages/v/vim-9.1.158-1.fc38.src.rpm
        checksum: sha256:94803b5e1ff601bf4009f223cb53037cdfa2fe559d90251bbe85a3a5bc6d2aab
        size: 14735448
        repoid: updates-source
";

    #[test]
    fn test_plan_vim_scenario() {
        let lock = parse(VIM_LOCKFILE);
        let batches = plan(&lock, Path::new("/output")).unwrap();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].kind, ArtifactKind::Package);
        assert_eq!(
            batches[0].files[0].dest,
            Path::new("/output/x86_64/updates/vim-enhanced-9.1.158-1.fc38.x86_64.rpm")
        );
        assert_eq!(batches[1].kind, ArtifactKind::Source);
        assert_eq!(
            batches[1].files[0].dest,
            Path::new("/output/x86_64/updates-source/vim-9.1.158-1.fc38.src.rpm")
        );
    }

    #[test]
    fn test_plan_internal_repoid_fallback() {
        let lock = parse(
            "
lockfileVersion: 1
lockfileVendor: redhat
arches:
  - arch: x86_64
    packages:
      - url: https://example.com/foo-1.0-1.fc40.x86_64.rpm
        checksum: sha256:aa
        size: 1
    source:
      - url: https://example.com/foo-1.0-1.fc40.src.rpm
        checksum: sha256:bb
        size: 2
",
        );
        let batches = plan(&lock, Path::new("/output")).unwrap();

        assert_eq!(
            batches[0].files[0].dest,
            Path::new("/output/x86_64/cachi-abcdef/foo-1.0-1.fc40.x86_64.rpm")
        );
        assert_eq!(
            batches[1].files[0].dest,
            Path::new("/output/x86_64/cachi-abcdef-source/foo-1.0-1.fc40.src.rpm")
        );
    }

    #[test]
    fn test_plan_paths_disjoint_and_injective() {
        let lock = parse(VIM_LOCKFILE);
        let batches = plan(&lock, Path::new("/output")).unwrap();

        let mut all_paths: Vec<&PathBuf> = batches
            .iter()
            .flat_map(|b| b.files.iter().map(|f| &f.dest))
            .collect();
        let count = all_paths.len();
        all_paths.sort();
        all_paths.dedup();
        assert_eq!(all_paths.len(), count);
    }

    #[test]
    fn test_plan_rejects_colliding_destinations() {
        let lock = parse(
            "
lockfileVersion: 1
lockfileVendor: redhat
arches:
  - arch: x86_64
    packages:
      - url: https://mirror-a.example.com/foo-1.0-1.fc40.x86_64.rpm
        checksum: sha256:aa
        size: 1
        repoid: updates
      - url: https://mirror-b.example.com/foo-1.0-1.fc40.x86_64.rpm
        checksum: sha256:bb
        size: 2
        repoid: updates
",
        );
        let err = plan(&lock, Path::new("/output")).unwrap_err();
        assert!(err.to_string().contains("same path"));
    }

    #[test]
    fn test_plan_is_idempotent() {
        let lock = parse(VIM_LOCKFILE);
        let first: Vec<PathBuf> = plan(&lock, Path::new("/output"))
            .unwrap()
            .iter()
            .flat_map(|b| b.files.iter().map(|f| f.dest.clone()))
            .collect();
        let second: Vec<PathBuf> = plan(&lock, Path::new("/output"))
            .unwrap()
            .iter()
            .flat_map(|b| b.files.iter().map(|f| f.dest.clone()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_download_builds_metadata_map() {
        use std::sync::Mutex;

        struct RecordingFetcher {
            calls: Mutex<Vec<BTreeMap<String, PathBuf>>>,
        }

        impl FileFetcher for RecordingFetcher {
            fn download(
                &self,
                files: &BTreeMap<String, PathBuf>,
                _concurrency_limit: usize,
            ) -> Result<()> {
                self.calls.lock().unwrap().push(files.clone());
                Ok(())
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let lock = parse(VIM_LOCKFILE);
        let fetcher = RecordingFetcher {
            calls: Mutex::new(Vec::new()),
        };

        let metadata = download(&lock, tmp.path(), &fetcher, 5).unwrap();

        // One fetcher invocation per (arch, kind) partition
        assert_eq!(fetcher.calls.lock().unwrap().len(), 2);
        assert_eq!(metadata.len(), 2);

        let binary_dest = tmp
            .path()
            .join("x86_64/updates/vim-enhanced-9.1.158-1.fc38.x86_64.rpm");
        let meta = &metadata[&binary_dest];
        assert!(meta.binary);
        assert_eq!(meta.size, 1976132);
        // Parent directories were created before the fetcher ran
        assert!(binary_dest.parent().unwrap().is_dir());

        let source_dest = tmp
            .path()
            .join("x86_64/updates-source/vim-9.1.158-1.fc38.src.rpm");
        assert!(!metadata[&source_dest].binary);
    }

    #[test]
    fn test_download_aborts_on_fetcher_failure() {
        struct FailingFetcher;

        impl FileFetcher for FailingFetcher {
            fn download(
                &self,
                _files: &BTreeMap<String, PathBuf>,
                _concurrency_limit: usize,
            ) -> Result<()> {
                Err(Error::DownloadError("1 of 1 downloads failed".to_string()))
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        let lock = parse(VIM_LOCKFILE);
        let err = download(&lock, tmp.path(), &FailingFetcher, 5).unwrap_err();
        assert!(matches!(err, Error::DownloadError(_)));
    }
}
