//! Reading and writing catalog snapshots
//!
//! A snapshot lives either in a single JSON document or in a directory with
//! one `<collection>.json` file per collection.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::Catalog;
use crate::error::MigrationError;
use crate::util::read_text_file;

/// Where a catalog snapshot is read from or written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    File(PathBuf),
    Directory(PathBuf),
}

impl CatalogLocation {
    pub fn path(&self) -> &Path {
        match self {
            CatalogLocation::File(path) | CatalogLocation::Directory(path) => path,
        }
    }
}

/// Load a catalog snapshot
pub fn load_catalog(location: &CatalogLocation) -> Result<Catalog> {
    let catalog = match location {
        CatalogLocation::File(path) => read_json(path)?,
        CatalogLocation::Directory(dir) => Catalog {
            containers: read_collection(dir, "containers")?,
            spaces: read_collection(dir, "spaces")?,
            folders: read_collection(dir, "folders")?,
            views: read_collection(dir, "virtualDatasets")?,
            physical_datasets: read_collection(dir, "physicalDatasets")?,
            sources: read_collection(dir, "sources")?,
            homes: read_collection(dir, "homes")?,
            reflections: read_collection(dir, "reflections")?,
            tags: read_collection(dir, "tags")?,
            wikis: read_collection(dir, "wikis")?,
            dependencies: read_collection(dir, "datasetParents")?,
        },
    };

    info!(
        "Loaded catalog from {}: {} spaces, {} folders, {} views",
        location.path().display(),
        catalog.spaces.len(),
        catalog.folders.len(),
        catalog.views.len()
    );

    Ok(catalog)
}

/// Write a catalog snapshot, creating parent directories as needed
pub fn save_catalog(catalog: &Catalog, location: &CatalogLocation) -> Result<()> {
    match location {
        CatalogLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                create_dir(parent)?;
            }
            write_json(path, catalog)?;
        }
        CatalogLocation::Directory(dir) => {
            create_dir(dir)?;
            write_json(&dir.join("containers.json"), &catalog.containers)?;
            write_json(&dir.join("spaces.json"), &catalog.spaces)?;
            write_json(&dir.join("folders.json"), &catalog.folders)?;
            write_json(&dir.join("virtualDatasets.json"), &catalog.views)?;
            write_json(&dir.join("physicalDatasets.json"), &catalog.physical_datasets)?;
            write_json(&dir.join("sources.json"), &catalog.sources)?;
            write_json(&dir.join("homes.json"), &catalog.homes)?;
            write_json(&dir.join("reflections.json"), &catalog.reflections)?;
            write_json(&dir.join("tags.json"), &catalog.tags)?;
            write_json(&dir.join("wikis.json"), &catalog.wikis)?;
            write_json(&dir.join("datasetParents.json"), &catalog.dependencies)?;
        }
    }

    info!("Saved catalog to {}", location.path().display());
    Ok(())
}

fn read_collection<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(format!("{}.json", name));
    if !path.exists() {
        debug!("No {} file in {}, using empty collection", name, dir.display());
        return Ok(Vec::new());
    }
    read_json(&path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_text_file(path).map_err(|source| MigrationError::CatalogReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| {
        MigrationError::CatalogParseError {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(value)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|source| {
        MigrationError::CatalogWriteError {
            path: path.to_path_buf(),
            source: source.into(),
        }
    })?;
    std::fs::write(path, content).map_err(|source| MigrationError::CatalogWriteError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| MigrationError::CatalogWriteError {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}
