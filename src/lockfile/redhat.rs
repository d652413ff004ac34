// src/lockfile/redhat.rs

//! Red Hat vendor lockfile schema.
//!
//! Distinguishing marks: `lockfileVendor: redhat`, `lockfileVersion: 1`,
//! and source artifacts listed under the singular `source` key.

use super::{ArchGroup, Lockfile, Package, TokenSource, DEFAULT_LOCKFILE_NAME, TOKEN_LEN};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::Value;

#[derive(Deserialize)]
struct Document {
    #[serde(rename = "lockfileVersion")]
    version: u32,
    #[serde(rename = "lockfileVendor")]
    vendor: String,
    arches: Vec<DocumentArch>,
}

#[derive(Deserialize)]
struct DocumentArch {
    arch: String,
    #[serde(default)]
    packages: Vec<Package>,
    #[serde(default)]
    source: Vec<Package>,
}

pub(super) fn matches(doc: &Value) -> bool {
    doc.get("lockfileVendor").and_then(Value::as_str) == Some("redhat")
        && doc.get("lockfileVersion").and_then(Value::as_u64) == Some(1)
}

pub(super) fn parse(doc: &Value, tokens: &dyn TokenSource) -> Result<Lockfile> {
    let document: Document = serde_yaml::from_value(doc.clone()).map_err(|e| {
        Error::SchemaError(format!(
            "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' format is not valid: {e}"
        ))
    })?;

    let arches = document
        .arches
        .into_iter()
        .map(|group| ArchGroup {
            arch: group.arch,
            packages: group.packages,
            sources: group.source,
        })
        .collect();

    Lockfile::new(
        document.version,
        document.vendor,
        arches,
        tokens.token(TOKEN_LEN),
    )
}
