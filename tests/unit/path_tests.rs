//! Unit tests for catalog paths and rule rebuilding

use catalog_migrate::catalog::{CatalogPath, MigrationRule};

fn path(segments: &[&str]) -> CatalogPath {
    CatalogPath::from(segments)
}

fn rule(src: &[&str], dst: &[&str]) -> MigrationRule {
    MigrationRule::new(path(src), path(dst))
}

// ============================================================================
// Prefix matching
// ============================================================================

#[test]
fn test_prefix_is_case_sensitive() {
    assert!(path(&["Prod"]).is_prefix_of(&path(&["Prod", "Sales"])));
    assert!(!path(&["prod"]).is_prefix_of(&path(&["Prod", "Sales"])));
}

#[test]
fn test_prefix_requires_whole_segments() {
    assert!(!path(&["Prod", "Sal"]).is_prefix_of(&path(&["Prod", "Sales"])));
}

#[test]
fn test_overlap_is_symmetric() {
    let pairs = [
        (path(&["a"]), path(&["a", "b", "c"])),
        (path(&["a", "b"]), path(&["a", "x"])),
        (path(&[]), path(&["a"])),
    ];
    for (left, right) in &pairs {
        assert_eq!(left.overlaps(right), right.overlaps(left), "{} / {}", left, right);
    }
}

// ============================================================================
// Rebuild
// ============================================================================

#[test]
fn test_rebuild_length_and_suffix() {
    let rules = [
        rule(&["a"], &["x", "y", "z"]),
        rule(&["a", "b"], &["x"]),
        rule(&["a", "b", "c"], &["a", "b", "c"]),
    ];
    let candidates = [
        path(&["a", "b", "c"]),
        path(&["a", "b", "c", "d", "e"]),
        path(&["a", "b"]),
    ];

    for rule in &rules {
        for p in candidates.iter().filter(|p| rule.src_path.is_prefix_of(p)) {
            let rebuilt = rule.rebuild(p);
            assert_eq!(
                rebuilt.len(),
                rule.dst_path.len() + p.len() - rule.src_path.len(),
                "{} on {}",
                rule,
                p
            );
            assert!(rule.dst_path.is_prefix_of(&rebuilt));
            assert_eq!(
                &rebuilt.segments()[rule.dst_path.len()..],
                &p.segments()[rule.src_path.len()..]
            );
        }
    }
}

#[test]
fn test_rebuild_context_never_deeper_than_context() {
    let rule = rule(&["Prod", "Sales", "EU"], &["Analytics"]);
    // The destination is shorter than the context: truncation keeps it whole
    assert_eq!(rule.rebuild_context(&path(&["Prod", "Sales"])), path(&["Analytics"]));
    assert_eq!(
        rule.rebuild_context(&path(&["Prod", "Sales", "EU", "Raw"])),
        path(&["Analytics", "Raw"])
    );
}

#[test]
fn test_rule_deserializes_from_camel_case() {
    let rule: MigrationRule =
        serde_json::from_str(r#"{"srcPath": ["a", "b"], "dstPath": ["x"]}"#).unwrap();
    assert_eq!(rule.src_path, path(&["a", "b"]));
    assert_eq!(rule.to_string(), "a.b -> x");
}
