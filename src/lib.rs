//! catalog-migrate: moves a catalog of SQL-defined views between space and
//! folder layouts
//!
//! Paths are remapped by prefix rules, every view whose SQL references a
//! moved object is rewritten, and the space/folder tree is pruned and
//! regrown so the catalog stays consistent.

pub mod catalog;
pub mod config;
pub mod error;
pub mod error_sink;
pub mod migrate;
pub mod sql;
pub mod util;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

pub use catalog::{Catalog, CatalogPath, MigrationRule};
pub use config::MigrationConfig;
pub use error::MigrationError;
pub use error_sink::{DirectoryErrorSink, ErrorSink, MemoryErrorSink, ViewFailure};
pub use migrate::{migrate_catalog, MigrationPlan, MigrationSummary};

/// Options for a file based migration run
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Path to the migration configuration file
    pub config_path: PathBuf,
}

/// Load the configured catalog, migrate it and save the result.
pub fn run_migration(options: MigrateOptions) -> Result<MigrationSummary> {
    info!("Reading configuration: {}", options.config_path.display());

    // Step 1: Configuration
    let config = MigrationConfig::load(&options.config_path)?;
    let (source, destination, error_directory) = match (
        config.source_location(),
        config.destination_location(),
        config.error_directory(),
    ) {
        (Some(source), Some(destination), Some(errors)) => (source, destination, errors),
        _ => {
            return Err(MigrationError::InvalidConfig {
                message: "source and destination locations are required".to_string(),
            }
            .into())
        }
    };

    // Step 2: Load the catalog
    let mut catalog = catalog::load_catalog(&source)?;

    // Step 3: Migrate
    let mut sink = DirectoryErrorSink::new(error_directory);
    let summary = migrate_catalog(&mut catalog, &config.plan(), &mut sink)?;
    if sink.count() > 0 {
        info!(
            "{} failed views written to {}",
            sink.count(),
            sink.directory().display()
        );
    }

    // Step 4: Save
    catalog::save_catalog(&catalog, &destination)?;

    Ok(summary)
}
