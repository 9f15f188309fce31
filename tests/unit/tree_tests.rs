//! Unit tests for pruning and tree reconciliation

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use serde_json::json;

use catalog_migrate::catalog::{Catalog, CatalogPath, MigrationRule};
use catalog_migrate::migrate::{in_destination_scope, prune_catalog, reconcile_tree};
use catalog_migrate::MigrationError;

fn catalog(value: serde_json::Value) -> Catalog {
    serde_json::from_value(value).unwrap()
}

/// Every path listed by some space or folder, with multiplicity
fn listed_paths(catalog: &Catalog) -> Vec<CatalogPath> {
    catalog
        .spaces
        .iter()
        .flat_map(|s| s.children.iter())
        .chain(catalog.folders.iter().flat_map(|f| f.children.iter()))
        .map(|c| c.path.clone())
        .collect()
}

#[test]
fn test_orphaned_folder_scenario() {
    let mut catalog = catalog(json!({
        "spaces": [{
            "id": "s1",
            "name": "Analytics",
            "children": [{"id": "f1", "path": ["Analytics", "Sales"], "type": "CONTAINER", "containerType": "FOLDER"}]
        }],
        "folders": [
            {"id": "f1", "path": ["Analytics", "Sales"], "children": []},
            {"id": "f9", "path": ["Analytics", "Sales", "EU", "Archive"], "children": []}
        ]
    }));

    let synthesized = reconcile_tree(&mut catalog).unwrap();

    assert_eq!(synthesized, 1);
    let eu = CatalogPath::new(["Analytics", "Sales", "EU"]);
    let eu_position = catalog.folders.iter().position(|f| f.path == eu).unwrap();
    let archive_position = catalog.folders.iter().position(|f| f.id == "f9").unwrap();
    assert!(eu_position < archive_position);
    assert_eq!(
        catalog.folders.iter().filter(|f| f.path == eu).count(),
        1
    );
}

#[test]
fn test_reconciled_tree_lists_everything_once() {
    let mut catalog = catalog(json!({
        "spaces": [
            {"id": "s1", "name": "A", "children": []},
            {"id": "s2", "name": "B", "children": [
                {"id": "v9", "path": ["B", "gone"], "type": "DATASET", "datasetType": "VIRTUAL"}
            ]}
        ],
        "folders": [
            {"id": "f1", "path": ["A", "x"], "children": []},
            {"id": "f2", "path": ["A", "x"], "children": []},
            {"id": "f3", "path": ["B", "p", "q", "r"], "children": []}
        ],
        "virtualDatasets": [
            {"id": "v1", "path": ["A", "x", "v"], "sql": "SELECT 1"},
            {"id": "v2", "path": ["B", "v"], "sql": "SELECT 1"},
            {"id": "v3", "path": ["B", "p", "q", "v"], "sql": "SELECT 1"}
        ]
    }));

    reconcile_tree(&mut catalog).unwrap();

    let listed = listed_paths(&catalog);
    let unique: HashSet<&CatalogPath> = listed.iter().collect();
    assert_eq!(unique.len(), listed.len(), "a path is listed twice");

    let folder_paths: HashSet<&CatalogPath> = catalog.folders.iter().map(|f| &f.path).collect();
    assert_eq!(folder_paths.len(), catalog.folders.len(), "two folders share a path");

    let mut entities: Vec<CatalogPath> = catalog
        .folders
        .iter()
        .map(|f| f.path.clone())
        .chain(catalog.views.iter().map(|v| v.path.clone()))
        .collect();
    entities.sort();
    let mut listed = listed;
    listed.sort();
    assert_eq!(listed, entities);
}

#[test]
fn test_missing_space_for_orphan_folder() {
    let mut catalog = catalog(json!({
        "folders": [{"id": "f1", "path": ["Nowhere", "x"], "children": []}]
    }));
    let err = reconcile_tree(&mut catalog).unwrap_err();
    assert!(matches!(err, MigrationError::MissingSpace { ref space, .. } if space == "Nowhere"));
}

#[test]
fn test_pruning_survivors_overlap_a_destination() {
    let rules = vec![
        MigrationRule::new(CatalogPath::new(["Prod"]), CatalogPath::new(["Analytics", "Core"])),
        MigrationRule::new(CatalogPath::new(["Dev", "x"]), CatalogPath::new(["Sandbox"])),
    ];
    let mut catalog = catalog(json!({
        "spaces": [
            {"id": "s1", "name": "Analytics"},
            {"id": "s2", "name": "Sandbox"},
            {"id": "s3", "name": "Dev"}
        ],
        "folders": [
            {"id": "f1", "path": ["Analytics", "Core", "x"]},
            {"id": "f2", "path": ["Analytics", "Edge"]},
            {"id": "f3", "path": ["Sandbox", "deep", "er"]}
        ],
        "virtualDatasets": [
            {"id": "v1", "path": ["Analytics", "Core", "v"], "sql": "SELECT 1"},
            {"id": "v2", "path": ["Dev", "x", "v"], "sql": "SELECT 1"}
        ],
        "tags": [{"path": ["Sandbox", "t"]}, {"path": ["Elsewhere"]}],
        "wikis": [{"path": ["Analytics"]}]
    }));

    let dropped = prune_catalog(&mut catalog, &rules);

    assert_eq!(dropped, 4);
    let survivors = catalog
        .spaces
        .iter()
        .map(|s| s.path())
        .chain(catalog.folders.iter().map(|f| f.path.clone()))
        .chain(catalog.views.iter().map(|v| v.path.clone()))
        .chain(catalog.tags.iter().map(|t| t.path.clone()))
        .chain(catalog.wikis.iter().map(|w| w.path.clone()));
    for path in survivors {
        assert!(in_destination_scope(&path, &rules), "{} survived", path);
    }
}
