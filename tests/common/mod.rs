//! Common test utilities for catalog-migrate tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use catalog_migrate::{run_migration, MigrateOptions, MigrationSummary};

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write `value` as pretty JSON under the context root
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directory");
        }
        let text = serde_json::to_string_pretty(value).expect("Failed to serialize JSON");
        fs::write(&path, text).expect("Failed to write JSON");
        path
    }

    /// Write a migration config whose locations are relative to the context
    /// root. `locations` maps config keys (e.g. `sourceFile`) to names.
    pub fn write_config(&self, rules: Value, locations: &[(&str, &str)]) -> PathBuf {
        let mut config = rules;
        let object = config.as_object_mut().expect("config must be an object");
        for (key, name) in locations {
            object.insert(
                key.to_string(),
                Value::String(self.path(name).to_string_lossy().into_owned()),
            );
        }
        self.write_json("migration.json", &config)
    }

    pub fn migrate(&self, config_path: &Path) -> anyhow::Result<MigrationSummary> {
        run_migration(MigrateOptions {
            config_path: config_path.to_path_buf(),
        })
    }
}

/// Read a JSON file written by the tool
pub fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("Invalid JSON in {}: {}", path.display(), e))
}

/// `path` arrays of a collection, dotted
pub fn paths(collection: &Value) -> Vec<String> {
    collection
        .as_array()
        .expect("collection must be an array")
        .iter()
        .map(|entry| dotted(&entry["path"]))
        .collect()
}

pub fn dotted(path: &Value) -> String {
    path.as_array()
        .expect("path must be an array")
        .iter()
        .map(|s| s.as_str().expect("path segment must be a string"))
        .collect::<Vec<_>>()
        .join(".")
}

/// Catalog export with one space, two folders, three views and their
/// annotations. `Prod.Sales.Broken` does not parse.
pub fn sample_catalog() -> Value {
    serde_json::json!({
        "containers": [
            {"id": "c1", "path": ["Prod"], "containerType": "SPACE"},
            {"id": "c2", "path": ["Prod", "Sales"], "containerType": "FOLDER"},
            {"id": "c3", "path": ["lake"], "containerType": "SOURCE"}
        ],
        "spaces": [{
            "id": "s1",
            "name": "Prod",
            "tag": "v1",
            "children": [
                {"id": "f1", "path": ["Prod", "Sales"], "type": "CONTAINER", "containerType": "FOLDER"},
                {"id": "f2", "path": ["Prod", "HR"], "type": "CONTAINER", "containerType": "FOLDER"}
            ]
        }],
        "folders": [
            {"id": "f1", "path": ["Prod", "Sales"], "children": [
                {"id": "v1", "path": ["Prod", "Sales", "Orders"], "type": "DATASET", "datasetType": "VIRTUAL"},
                {"id": "v2", "path": ["Prod", "Sales", "Summary"], "type": "DATASET", "datasetType": "VIRTUAL"},
                {"id": "v3", "path": ["Prod", "Sales", "Broken"], "type": "DATASET", "datasetType": "VIRTUAL"}
            ]},
            {"id": "f2", "path": ["Prod", "HR"], "children": []}
        ],
        "virtualDatasets": [
            {
                "id": "v1",
                "path": ["Prod", "Sales", "Orders"],
                "sql": "SELECT * FROM lake.raw.orders",
                "sqlContext": ["Prod", "Sales"],
                "owner": "etl"
            },
            {
                "id": "v2",
                "path": ["Prod", "Sales", "Summary"],
                "sql": "// totals per customer\nSELECT c.name, SUM(o.total) AS total\nFROM Prod.Sales.Orders AS o\nJOIN Prod.Sales.Customers AS c ON o.cid = c.id\nGROUP BY c.name"
            },
            {
                "id": "v3",
                "path": ["Prod", "Sales", "Broken"],
                "sql": "SELECT * FROM (SELECT 1"
            }
        ],
        "physicalDatasets": [{"path": ["lake", "raw", "orders"]}],
        "sources": [{"name": "lake"}],
        "homes": [{"name": "@admin"}],
        "reflections": [{"id": "r1", "name": "by_customer", "path": ["Prod", "Sales", "Summary"]}],
        "tags": [{"path": ["Prod", "Sales", "Orders"], "tags": ["eu"]}],
        "wikis": [{"path": ["Prod", "HR"], "text": "people"}],
        "datasetParents": [
            {"path": ["Prod", "Sales", "Summary"], "parents": ["Prod/Sales/Orders", "Prod/Sales/Customers"]},
            {"path": ["Prod", "Sales", "Orders"], "parents": ["lake/raw/orders"]}
        ]
    })
}
