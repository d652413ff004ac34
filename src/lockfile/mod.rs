// src/lockfile/mod.rs

//! Lockfile model and vendor format registry.
//!
//! The physical lockfile may follow one of several vendor-specific
//! schemas; all of them normalize into the same logical [`Lockfile`]
//! shape. Each format is a pure match predicate plus a pure parse
//! function, tried in registration order with the first match winning.

mod generic;
mod redhat;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

/// Project-relative file name the resolver looks for
pub const DEFAULT_LOCKFILE_NAME: &str = "rpms.lock.yaml";

/// Length of the random token inside internal repository ids
pub const TOKEN_LEN: usize = 6;

/// One pinned artifact from the lockfile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Logical origin repository; absent for artifacts with no named upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repoid: Option<String>,
    pub url: String,
    /// Algorithm-prefixed digest, e.g. `sha256:<hex>`
    pub checksum: String,
    /// Expected byte length on disk
    pub size: u64,
}

/// Binary and source artifacts pinned for one architecture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchGroup {
    pub arch: String,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub sources: Vec<Package>,
}

/// Parsed, normalized lockfile document
#[derive(Debug)]
pub struct Lockfile {
    pub version: u32,
    pub vendor: String,
    pub arches: Vec<ArchGroup>,
    /// Per-instance random token namespacing artifacts without a repoid
    token: String,
    internal_repoid: OnceLock<String>,
    internal_source_repoid: OnceLock<String>,
}

impl Lockfile {
    /// Build a lockfile from normalized parts, rejecting duplicate architectures
    pub fn new(version: u32, vendor: String, arches: Vec<ArchGroup>, token: String) -> Result<Self> {
        let mut seen = HashSet::new();
        for group in &arches {
            if !seen.insert(group.arch.as_str()) {
                return Err(Error::SchemaError(format!(
                    "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' lists architecture '{}' more than once",
                    group.arch
                )));
            }
        }

        Ok(Self {
            version,
            vendor,
            arches,
            token,
            internal_repoid: OnceLock::new(),
            internal_source_repoid: OnceLock::new(),
        })
    }

    /// Repository id for binary artifacts that carry no repoid.
    ///
    /// Stable for the lifetime of this instance, different across parses.
    pub fn internal_repoid(&self) -> &str {
        self.internal_repoid
            .get_or_init(|| format!("cachi-{}", self.token))
    }

    /// Repository id for source artifacts that carry no repoid
    pub fn internal_source_repoid(&self) -> &str {
        self.internal_source_repoid
            .get_or_init(|| format!("cachi-{}-source", self.token))
    }
}

/// Source of random tokens for internal repository ids.
///
/// Injected into parsing so tests can supply a fixed token. Collision
/// safety is a namespacing convenience here, not a security property.
pub trait TokenSource {
    fn token(&self, len: usize) -> String;
}

/// Default token source drawing from a random UUID
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn token(&self, len: usize) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        hex[..len.min(hex.len())].to_string()
    }
}

/// One registered vendor schema: a pure match predicate plus a pure parser
pub struct FormatSpec {
    pub name: &'static str,
    pub matches: fn(&Value) -> bool,
    pub parse: fn(&Value, &dyn TokenSource) -> Result<Lockfile>,
}

/// Registered formats, tried in order; first match wins
pub const FORMATS: &[FormatSpec] = &[
    FormatSpec {
        name: "redhat",
        matches: redhat::matches,
        parse: redhat::parse,
    },
    FormatSpec {
        name: "generic",
        matches: generic::matches,
        parse: generic::parse,
    },
];

/// Parse a loaded YAML document with the first format that claims it
pub fn parse_lockfile(doc: &Value, tokens: &dyn TokenSource) -> Result<Lockfile> {
    for format in FORMATS {
        if (format.matches)(doc) {
            tracing::debug!("lockfile matched the '{}' format", format.name);
            return (format.parse)(doc, tokens);
        }
    }

    Err(Error::SchemaError(format!(
        "RPM lockfile '{DEFAULT_LOCKFILE_NAME}' does not match any supported format"
    )))
}
