use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_migrate::{run_migration, MigrateOptions};

#[derive(Parser)]
#[command(name = "catalog-migrate")]
#[command(author, version, about = "Migrate SQL-defined views between catalog space/folder layouts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate a catalog export according to a configuration file
    Migrate {
        /// Path to the JSON migration configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Enable debug output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { config, verbose } => {
            setup_logging(verbose);

            let summary = run_migration(MigrateOptions {
                config_path: config,
            })?;

            info!(
                "Migration finished: {} views written, {} parse failures, {} format failures",
                summary.views_written, summary.parse_failures, summary.format_failures
            );
            info!(
                "{} references rewritten, {} unrecognized clause shapes, {} entities dropped, {} folders synthesized",
                summary.references_rewritten,
                summary.unrecognized_shapes,
                summary.entities_dropped,
                summary.folders_synthesized
            );
        }
    }

    Ok(())
}
