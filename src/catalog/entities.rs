//! Catalog entity types
//!
//! Fields the migration does not interpret are kept in an `extra` map so that
//! a snapshot round-trips through the tool without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sqlparser::ast::Statement;

use super::CatalogPath;

pub const CONTAINER_TYPE_SPACE: &str = "SPACE";
pub const CONTAINER_TYPE_FOLDER: &str = "FOLDER";

/// Entry in a container listing (`containers` collection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default)]
    pub id: String,
    pub path: CatalogPath,
    pub container_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Container {
    /// Only spaces and folders take part in a migration.
    pub fn is_migratable(&self) -> bool {
        self.container_type == CONTAINER_TYPE_SPACE || self.container_type == CONTAINER_TYPE_FOLDER
    }
}

/// Kind of entity a [`ChildRef`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Folder,
    View,
    Other,
}

/// Reference from a space or folder to one of its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    pub id: String,
    pub path: CatalogPath,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<String>,
}

impl ChildRef {
    pub fn folder(id: &str, path: &CatalogPath) -> Self {
        Self {
            id: id.to_string(),
            path: path.clone(),
            entry_type: "CONTAINER".to_string(),
            container_type: Some(CONTAINER_TYPE_FOLDER.to_string()),
            dataset_type: None,
        }
    }

    pub fn view(id: &str, path: &CatalogPath) -> Self {
        Self {
            id: id.to_string(),
            path: path.clone(),
            entry_type: "DATASET".to_string(),
            container_type: None,
            dataset_type: Some("VIRTUAL".to_string()),
        }
    }

    pub fn kind(&self) -> ChildKind {
        match (
            self.entry_type.as_str(),
            self.container_type.as_deref(),
            self.dataset_type.as_deref(),
        ) {
            ("CONTAINER", Some(CONTAINER_TYPE_FOLDER), _) => ChildKind::Folder,
            ("DATASET", _, Some("VIRTUAL")) => ChildKind::View,
            _ => ChildKind::Other,
        }
    }
}

/// Root namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Space {
    /// One-segment path of the space.
    pub fn path(&self) -> CatalogPath {
        CatalogPath::new([self.name.as_str()])
    }
}

/// Nested namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub path: CatalogPath,
    #[serde(default)]
    pub children: Vec<ChildRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    /// A folder created to close a gap in the hierarchy: fresh identity,
    /// no children, empty access list.
    pub fn synthesized(path: CatalogPath) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            path,
            children: Vec::new(),
            entity_type: Some("folder".to_string()),
            access_control_list: Some(json!({ "roles": [] })),
            extra: Map::new(),
        }
    }
}

/// Virtual dataset defined by SQL text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: String,
    pub path: CatalogPath,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_context: Option<CatalogPath>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Parsed SQL, present only between parse and re-serialization
    #[serde(skip)]
    pub query: Option<Statement>,
}

/// Reflection (materialization) attached to a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub path: CatalogPath,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tag set attached to a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub path: CatalogPath,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Wiki text attached to a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wiki {
    pub path: CatalogPath,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Objects a view's resolved plan depends on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub path: CatalogPath,
    /// Slash-joined references (`Space/Folder/Table`)
    #[serde(default)]
    pub parents: Vec<String>,
}
