//! In-memory catalog snapshot

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    CatalogPath, ChildRef, Container, DependencyRecord, Folder, Reflection, Space, Tag, View, Wiki,
};

/// Every collection of a catalog export.
///
/// Collections are plain vectors: folder order is significant (a folder must
/// precede anything that depends on it when the snapshot is replayed), and
/// entities are addressed by path or by their stable `id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    pub containers: Vec<Container>,
    pub spaces: Vec<Space>,
    pub folders: Vec<Folder>,
    #[serde(rename = "virtualDatasets")]
    pub views: Vec<View>,
    pub physical_datasets: Vec<Value>,
    pub sources: Vec<Value>,
    pub homes: Vec<Value>,
    pub reflections: Vec<Reflection>,
    pub tags: Vec<Tag>,
    pub wikis: Vec<Wiki>,
    #[serde(rename = "datasetParents")]
    pub dependencies: Vec<DependencyRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop containers that are neither spaces nor folders.
    pub fn retain_migratable_containers(&mut self) {
        self.containers.retain(Container::is_migratable);
    }

    /// Physical datasets, sources and home spaces are never carried over.
    pub fn clear_physical_entities(&mut self) {
        self.physical_datasets.clear();
        self.sources.clear();
        self.homes.clear();
    }

    /// True if any space or folder lists `path` among its children.
    pub fn is_referenced(&self, path: &CatalogPath) -> bool {
        let listed = |children: &[ChildRef]| children.iter().any(|c| &c.path == path);
        self.spaces.iter().any(|s| listed(&s.children))
            || self.folders.iter().any(|f| listed(&f.children))
    }

    pub fn space_mut(&mut self, name: &str) -> Option<&mut Space> {
        self.spaces.iter_mut().find(|s| s.name == name)
    }

    pub fn folder_position(&self, path: &CatalogPath) -> Option<usize> {
        self.folders.iter().position(|f| &f.path == path)
    }

    /// `(id, path)` of every view no container lists as a child.
    pub fn unreferenced_views(&self) -> Vec<(String, CatalogPath)> {
        self.views
            .iter()
            .filter(|v| !self.is_referenced(&v.path))
            .map(|v| (v.id.clone(), v.path.clone()))
            .collect()
    }

    /// `(id, path)` of every folder no container lists as a child.
    pub fn unreferenced_folders(&self) -> Vec<(String, CatalogPath)> {
        self.folders
            .iter()
            .filter(|f| !self.is_referenced(&f.path))
            .map(|f| (f.id.clone(), f.path.clone()))
            .collect()
    }
}
