//! Error types for catalog-migrate

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogPath;

/// Errors that abort a migration run
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Failed to read migration config: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse migration config: {path}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid migration config: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to read catalog: {path}")]
    CatalogReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {path}")]
    CatalogParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write catalog: {path}")]
    CatalogWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write error file: {path}")]
    ErrorSinkWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Space not found: {space} (required by {entity})")]
    MissingSpace { space: String, entity: CatalogPath },

    #[error("Entity has no parent container: {path}")]
    RootLevelEntity { path: CatalogPath },

    #[error("Views {first} and {second} were both moved to {path}")]
    PathCollision {
        path: CatalogPath,
        first: String,
        second: String,
    },
}
