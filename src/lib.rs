// src/lib.rs

//! rpmfetch: hermetic-build dependency prefetcher for the RPM ecosystem.
//!
//! Given a pinned lockfile (`rpms.lock.yaml`) describing exact binary
//! and source packages per architecture, rpmfetch downloads every
//! artifact with bounded concurrency, verifies each against its declared
//! checksum and size, emits SBOM components for the binary packages, and
//! assembles the result into locally servable package repositories.
//!
//! # Pipeline
//!
//! Lockfile bytes -> parsed model -> download -> verify -> SBOM
//! components, then repository assembly as a separate post step. Every
//! failure is fatal to the run; partially downloaded state is safe to
//! leave on disk because destination paths are deterministic and a
//! re-run overwrites and re-verifies.

pub mod cli;
pub mod config;
mod error;
pub mod fetch;
pub mod hash;
pub mod lockfile;
pub mod metadata;
pub mod repodata;
pub mod resolver;
pub mod sbom;
pub mod verify;

pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{FileFetcher, HttpFetcher};
pub use lockfile::{Lockfile, RandomTokens, TokenSource, DEFAULT_LOCKFILE_NAME};
pub use resolver::{build_local_repos, fetch_rpm_source, resolve_project};
pub use sbom::Component;

/// Output sub-directory receiving the downloaded package tree
pub const DEFAULT_PACKAGE_DIR: &str = "deps/rpm";
