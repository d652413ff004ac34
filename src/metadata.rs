// src/metadata.rs

//! Package identity extraction via the external `rpm` binary.
//!
//! Every downloaded binary artifact is queried for the fields needed to
//! build its SBOM component. A query failure is fatal: an artifact that
//! cannot be introspected cannot be attested, and omitting it would
//! produce a misleadingly complete SBOM.

use crate::error::{Error, Result};
use crate::fetch::FileMetadata;
use crate::sbom::{rpm_purl, Component};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Query format: six newline-delimited fields in fixed order
const RPM_QUERY_FORMAT: &str = "%{NAME}\n%{VERSION}\n%{RELEASE}\n%{ARCH}\n%{VENDOR}\n%{EPOCH}";

/// Identity fields of one RPM artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpmIdentity {
    pub name: String,
    pub version: String,
    pub release: String,
    pub arch: String,
    pub vendor: Option<String>,
    pub epoch: Option<String>,
}

fn normalize_field(raw: &str) -> Option<String> {
    if raw.is_empty() || raw == "(none)" {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Parse the queryformat output into an identity record
pub fn parse_query_output(stdout: &str, path: &Path) -> Result<RpmIdentity> {
    // Epoch may legitimately be empty, so split rather than iterate lines
    let fields: Vec<&str> = stdout.split('\n').collect();
    if fields.len() != 6 || fields[..4].iter().any(|f| f.is_empty()) {
        return Err(Error::MetadataExtractionError(format!(
            "unexpected rpm output for {}: {stdout:?}",
            path.display()
        )));
    }

    Ok(RpmIdentity {
        name: fields[0].to_string(),
        version: fields[1].to_string(),
        release: fields[2].to_string(),
        arch: fields[3].to_string(),
        vendor: normalize_field(fields[4]),
        epoch: normalize_field(fields[5]),
    })
}

/// Query one artifact file with the `rpm` binary
pub fn query_rpm_identity(path: &Path) -> Result<RpmIdentity> {
    debug!("querying package identity of {}", path.display());

    let output = Command::new("rpm")
        .args(["-q", "--queryformat", RPM_QUERY_FORMAT, "-p"])
        .arg(path)
        .output()
        .map_err(|e| {
            Error::MetadataExtractionError(format!("failed to run rpm: {e}. Is rpm installed?"))
        })?;

    if !output.status.success() {
        return Err(Error::MetadataExtractionError(format!(
            "rpm query of {} failed: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_query_output(&String::from_utf8_lossy(&output.stdout), path)
}

/// Build one SBOM component per downloaded binary package.
///
/// Source artifacts are fetched and verified but produce no components.
pub fn build_components(metadata: &BTreeMap<PathBuf, FileMetadata>) -> Result<Vec<Component>> {
    let mut components = Vec::new();

    for (path, meta) in metadata {
        if !meta.binary {
            continue;
        }

        let identity = query_rpm_identity(path)?;
        components.push(component_for(&identity, &meta.url));
    }

    Ok(components)
}

/// Turn an identity record plus its original download URL into a component
pub fn component_for(identity: &RpmIdentity, download_url: &str) -> Component {
    let purl = rpm_purl(
        identity.vendor.as_deref(),
        &identity.name,
        identity.epoch.as_deref(),
        &identity.version,
        &identity.release,
        &identity.arch,
        download_url,
    );

    Component {
        name: identity.name.clone(),
        version: identity.version.clone(),
        purl,
    }
}
