// src/lockfile/generic.rs

//! Fallback lockfile schema for non-Red-Hat vendors.
//!
//! Accepts any document with an integer `lockfileVersion` and an `arches`
//! sequence; source artifacts live under the plural `sources` key. Must
//! stay registered after the more specific vendor formats.

use super::{ArchGroup, Lockfile, TokenSource, DEFAULT_LOCKFILE_NAME, TOKEN_LEN};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_yaml::Value;

#[derive(Deserialize)]
struct Document {
    #[serde(rename = "lockfileVersion")]
    version: u32,
    #[serde(rename = "lockfileVendor", default = "unknown_vendor")]
    vendor: String,
    arches: Vec<ArchGroup>,
}

fn unknown_vendor() -> String {
    "unknown".to_string()
}

pub(super) fn matches(doc: &Value) -> bool {
    doc.get("lockfileVersion").and_then(Value::as_u64).is_some()
        && doc.get("arches").is_some_and(Value::is_sequence)
}

pub(super) fn parse(doc: &Value, tokens: &dyn TokenSource) -> Result<Lockfile> {
    let document: Document = serde_yaml::from_value(doc.clone()).map_err(|e| {
        Error::SchemaError(format!(
            "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' format is not valid: {e}"
        ))
    })?;

    Lockfile::new(
        document.version,
        document.vendor,
        document.arches,
        tokens.token(TOKEN_LEN),
    )
}
