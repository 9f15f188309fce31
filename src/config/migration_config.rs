//! Migration configuration file

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{CatalogLocation, MigrationRule};
use crate::error::MigrationError;
use crate::migrate::MigrationPlan;
use crate::util::read_text_file;

const ERROR_DIRECTORY_SUFFIX: &str = "_errors";

/// Contents of a migration configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    #[serde(default)]
    pub space_folder_migrations: Option<Vec<MigrationRule>>,
    #[serde(default)]
    pub source_migrations: Option<Vec<MigrationRule>>,
    #[serde(default)]
    pub source_file: Option<PathBuf>,
    #[serde(default)]
    pub source_directory: Option<PathBuf>,
    #[serde(default)]
    pub destination_file: Option<PathBuf>,
    #[serde(default)]
    pub destination_directory: Option<PathBuf>,
}

impl MigrationConfig {
    /// Read, parse and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let text = read_text_file(path).map_err(|e| MigrationError::ConfigReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: MigrationConfig =
            serde_json::from_str(&text).map_err(|e| MigrationError::ConfigParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_json(text: &str) -> Result<Self, MigrationError> {
        let config: MigrationConfig =
            serde_json::from_str(text).map_err(|e| MigrationError::InvalidConfig {
                message: format!("malformed JSON: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MigrationError> {
        let families = [
            ("spaceFolderMigrations", &self.space_folder_migrations),
            ("sourceMigrations", &self.source_migrations),
        ];
        for (family, rules) in families {
            for (index, rule) in rules.iter().flatten().enumerate() {
                if rule.src_path.is_empty() || rule.dst_path.is_empty() {
                    return Err(invalid(format!(
                        "{}[{}] needs a non-empty srcPath and dstPath",
                        family, index
                    )));
                }
            }
        }

        if self.source_file.is_none() && self.source_directory.is_none() {
            return Err(invalid("one of sourceFile or sourceDirectory is required"));
        }
        if self.destination_file.is_none() && self.destination_directory.is_none() {
            return Err(invalid(
                "one of destinationFile or destinationDirectory is required",
            ));
        }
        Ok(())
    }

    pub fn plan(&self) -> MigrationPlan {
        MigrationPlan {
            container_rules: self.space_folder_migrations.clone().unwrap_or_default(),
            source_rules: self.source_migrations.clone().unwrap_or_default(),
        }
    }

    /// Catalog to read. A file takes precedence over a directory.
    pub fn source_location(&self) -> Option<CatalogLocation> {
        location(&self.source_file, &self.source_directory)
    }

    /// Catalog to write. A file takes precedence over a directory.
    pub fn destination_location(&self) -> Option<CatalogLocation> {
        location(&self.destination_file, &self.destination_directory)
    }

    /// Directory receiving failed views: the destination path with an
    /// `_errors` suffix.
    pub fn error_directory(&self) -> Option<PathBuf> {
        let destination = self.destination_location()?;
        let mut name = OsString::from(destination.path().as_os_str());
        name.push(ERROR_DIRECTORY_SUFFIX);
        Some(PathBuf::from(name))
    }
}

fn location(file: &Option<PathBuf>, directory: &Option<PathBuf>) -> Option<CatalogLocation> {
    match (file, directory) {
        (Some(file), _) => Some(CatalogLocation::File(file.clone())),
        (None, Some(directory)) => Some(CatalogLocation::Directory(directory.clone())),
        (None, None) => None,
    }
}

fn invalid(message: impl Into<String>) -> MigrationError {
    MigrationError::InvalidConfig {
        message: message.into(),
    }
}
