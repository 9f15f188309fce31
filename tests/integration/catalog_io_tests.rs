//! Catalog snapshot locations: single file and per-collection directory

use std::fs;

use serde_json::{json, Value};

use catalog_migrate::catalog::{load_catalog, save_catalog, CatalogLocation};

use crate::common::{paths, read_json, sample_catalog, TestContext};

/// Split the sample catalog into one `<collection>.json` file per collection
fn write_catalog_directory(ctx: &TestContext, dir: &str) {
    let catalog = sample_catalog();
    for (collection, entries) in catalog.as_object().unwrap() {
        ctx.write_json(&format!("{}/{}.json", dir, collection), entries);
    }
}

#[test]
fn test_directory_to_directory_migration() {
    let ctx = TestContext::new();
    write_catalog_directory(&ctx, "export");
    let config = ctx.write_config(
        json!({
            "spaceFolderMigrations": [
                {"srcPath": ["Prod", "Sales"], "dstPath": ["Analytics", "Sales", "EU"]}
            ]
        }),
        &[("sourceDirectory", "export"), ("destinationDirectory", "migrated")],
    );

    let summary = ctx.migrate(&config).unwrap();
    assert_eq!(summary.views_written, 2);

    let out = ctx.path("migrated");
    for collection in [
        "containers",
        "spaces",
        "folders",
        "virtualDatasets",
        "physicalDatasets",
        "sources",
        "homes",
        "reflections",
        "tags",
        "wikis",
        "datasetParents",
    ] {
        assert!(
            out.join(format!("{}.json", collection)).is_file(),
            "missing {}.json",
            collection
        );
    }
    assert_eq!(
        paths(&read_json(&out.join("virtualDatasets.json"))),
        vec!["Analytics.Sales.EU.Orders", "Analytics.Sales.EU.Summary"]
    );
    assert_eq!(read_json(&out.join("sources.json")), json!([]));
    assert!(ctx.path("migrated_errors").join("error_1.sql").is_file());
}

#[test]
fn test_missing_collection_files_load_empty() {
    let ctx = TestContext::new();
    ctx.write_json(
        "partial/spaces.json",
        &json!([{"id": "s1", "name": "Prod", "children": []}]),
    );

    let catalog = load_catalog(&CatalogLocation::Directory(ctx.path("partial"))).unwrap();

    assert_eq!(catalog.spaces.len(), 1);
    assert!(catalog.folders.is_empty());
    assert!(catalog.views.is_empty());
    assert!(catalog.dependencies.is_empty());
}

#[test]
fn test_file_round_trip_keeps_unknown_fields() {
    let ctx = TestContext::new();
    let source = ctx.write_json("catalog.json", &sample_catalog());

    let catalog = load_catalog(&CatalogLocation::File(source)).unwrap();
    let target = ctx.path("nested/dir/catalog.json");
    save_catalog(&catalog, &CatalogLocation::File(target.clone())).unwrap();

    let saved: Value = read_json(&target);
    assert_eq!(saved["spaces"][0]["tag"], json!("v1"));
    assert_eq!(saved["virtualDatasets"][0]["owner"], json!("etl"));
    assert_eq!(saved["tags"][0]["tags"], json!(["eu"]));
    assert_eq!(saved["wikis"][0]["text"], json!("people"));
}

#[test]
fn test_utf8_bom_is_accepted() {
    let ctx = TestContext::new();
    let path = ctx.path("bom.json");
    fs::write(&path, "\u{FEFF}{\"spaces\": []}").unwrap();

    let catalog = load_catalog(&CatalogLocation::File(path)).unwrap();
    assert!(catalog.spaces.is_empty());
}
