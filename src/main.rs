// src/main.rs

use anyhow::Result;
use clap::Parser;
use rpmfetch::cli::{Cli, Commands};
use rpmfetch::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            source_dir,
            output_dir,
            concurrency,
            sbom_output,
        } => {
            let config = match concurrency {
                Some(limit) => Config::with_concurrency_limit(limit),
                None => Config::default(),
            };

            let components = rpmfetch::fetch_rpm_source(&source_dir, &output_dir, &config)?;
            info!("fetched {} SBOM component(s)", components.len());

            let json = serde_json::to_string_pretty(&components)?;
            match sbom_output {
                Some(path) => std::fs::write(&path, json)?,
                None => println!("{json}"),
            }
        }

        Commands::BuildRepos {
            from_output_dir,
            for_output_dir,
        } => {
            let for_dir = for_output_dir.unwrap_or_else(|| from_output_dir.clone());
            rpmfetch::build_local_repos(&from_output_dir, &for_dir)?;
            info!("repository metadata written under {}", from_output_dir.display());
        }
    }

    Ok(())
}
