// tests/workflow.rs

//! End-to-end pipeline tests driving the resolver with an in-process
//! fetcher and a fixed token source.

use rpmfetch::hash::{hash_bytes, HashAlgorithm};
use rpmfetch::repodata;
use rpmfetch::{resolve_project, Config, Error, FileFetcher, TokenSource, DEFAULT_LOCKFILE_NAME};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

struct FixedTokens(&'static str);

impl TokenSource for FixedTokens {
    fn token(&self, len: usize) -> String {
        self.0[..len.min(self.0.len())].to_string()
    }
}

/// Fetcher that writes a fixed payload for every URL
struct StubFetcher {
    payload: &'static [u8],
}

impl FileFetcher for StubFetcher {
    fn download(&self, files: &BTreeMap<String, PathBuf>, _limit: usize) -> rpmfetch::Result<()> {
        for dest in files.values() {
            fs::write(dest, self.payload).unwrap();
        }
        Ok(())
    }
}

/// Lockfile with a single source artifact pinned to the given payload
fn sources_only_lockfile(payload: &[u8]) -> String {
    format!(
        "
lockfileVersion: 1
lockfileVendor: redhat
arches:
  - arch: x86_64
    packages: []
    source:
      - url: https://example.com/source/foo-1.0-1.fc40.src.rpm
        checksum: sha256:{}
        size: {}
        repoid: updates-source
",
        hash_bytes(HashAlgorithm::Sha256, payload),
        payload.len()
    )
}

fn snapshot_tree(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let contents = fs::read(&path).unwrap();
                files.push((path.strip_prefix(root).unwrap().to_path_buf(), contents));
            }
        }
    }
    files.sort();
    files
}

#[test]
fn test_full_pipeline_sources_only() {
    let payload = b"test data";
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        source.path().join(DEFAULT_LOCKFILE_NAME),
        sources_only_lockfile(payload),
    )
    .unwrap();

    let components = resolve_project(
        source.path(),
        output.path(),
        &StubFetcher { payload },
        &FixedTokens("abcdef"),
        &Config::default(),
    )
    .unwrap();

    // Source artifacts are verified but never produce SBOM components
    assert!(components.is_empty());

    let dest = output
        .path()
        .join("deps/rpm/x86_64/updates-source/foo-1.0-1.fc40.src.rpm");
    assert_eq!(fs::read(&dest).unwrap(), payload);
}

#[test]
fn test_pipeline_is_idempotent() {
    let payload = b"test data";
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        source.path().join(DEFAULT_LOCKFILE_NAME),
        sources_only_lockfile(payload),
    )
    .unwrap();

    let run = || {
        resolve_project(
            source.path(),
            output.path(),
            &StubFetcher { payload },
            &FixedTokens("abcdef"),
            &Config::default(),
        )
        .unwrap()
    };

    let first_components = run();
    let first_tree = snapshot_tree(output.path());

    let second_components = run();
    let second_tree = snapshot_tree(output.path());

    assert_eq!(first_components, second_components);
    assert_eq!(first_tree, second_tree);
}

#[test]
fn test_pipeline_rejects_corrupted_download() {
    let payload = b"test data";
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        source.path().join(DEFAULT_LOCKFILE_NAME),
        sources_only_lockfile(payload),
    )
    .unwrap();

    // Same length, different bytes: size check passes, digest check fails
    let err = resolve_project(
        source.path(),
        output.path(),
        &StubFetcher { payload: b"tampered!" },
        &FixedTokens("abcdef"),
        &Config::default(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::IntegrityError(_)));
    assert!(err.to_string().contains("Unmatched checksum of"));
}

#[test]
fn test_repofiles_after_fetch() {
    let payload = b"test data";
    let source = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        source.path().join(DEFAULT_LOCKFILE_NAME),
        sources_only_lockfile(payload),
    )
    .unwrap();

    resolve_project(
        source.path(),
        output.path(),
        &StubFetcher { payload },
        &FixedTokens("abcdef"),
        &Config::default(),
    )
    .unwrap();

    repodata::generate_repofiles(output.path(), Path::new("/build/output")).unwrap();

    let repofile = output
        .path()
        .join("deps/rpm/x86_64/repos.d")
        .join(repodata::REPOFILE_NAME);
    let written = fs::read_to_string(repofile).unwrap();
    assert!(written.starts_with("[updates-source]\n"));
    assert!(written.contains("baseurl=file:///build/output/deps/rpm/x86_64/updates-source\n"));
    assert!(written.ends_with(
        "name=Generated repository containing all packages unaffiliated with any official repository"
    ));
}
