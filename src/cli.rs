// src/cli.rs

//! Command-line interface definitions.
//!
//! The actual pipeline lives in the library; this module only describes
//! the clap surface consumed by `main`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rpmfetch")]
#[command(version)]
#[command(about = "Hermetic-build dependency prefetcher for the RPM ecosystem", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, verify, and attest every artifact in the lockfile
    Fetch {
        /// Project directory containing rpms.lock.yaml
        #[arg(short, long, default_value = ".")]
        source_dir: PathBuf,

        /// Directory receiving the downloaded package tree
        #[arg(short, long)]
        output_dir: PathBuf,

        /// Maximum simultaneous downloads (default: 5)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Write the SBOM component list to this file instead of stdout
        #[arg(long)]
        sbom_output: Option<PathBuf>,
    },

    /// Index downloaded packages and write repo configuration files
    BuildRepos {
        /// Output directory holding the downloaded package tree
        #[arg(short, long)]
        from_output_dir: PathBuf,

        /// Path the consuming package manager will see the tree at
        /// (defaults to the from directory)
        #[arg(long)]
        for_output_dir: Option<PathBuf>,
    },
}
