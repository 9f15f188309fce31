//! Removal of entities that fall outside every destination prefix

use tracing::info;

use crate::catalog::{Catalog, CatalogPath, MigrationRule};

/// True when `path` agrees with some rule's destination over their common
/// length.
pub fn in_destination_scope(path: &CatalogPath, rules: &[MigrationRule]) -> bool {
    rules.iter().any(|rule| rule.dst_path.overlaps(path))
}

/// Drop spaces, folders, views, tags and wikis outside every rule's
/// destination. Returns the number of entities removed.
pub fn prune_catalog(catalog: &mut Catalog, rules: &[MigrationRule]) -> usize {
    retain_in_scope(&mut catalog.spaces, rules, "space", |s| s.path())
        + retain_in_scope(&mut catalog.folders, rules, "folder", |f| f.path.clone())
        + retain_in_scope(&mut catalog.views, rules, "view", |v| v.path.clone())
        + retain_in_scope(&mut catalog.tags, rules, "tag", |t| t.path.clone())
        + retain_in_scope(&mut catalog.wikis, rules, "wiki", |w| w.path.clone())
}

fn retain_in_scope<T>(
    items: &mut Vec<T>,
    rules: &[MigrationRule],
    kind: &str,
    path_of: impl Fn(&T) -> CatalogPath,
) -> usize {
    let before = items.len();
    items.retain(|item| {
        let path = path_of(item);
        let keep = in_destination_scope(&path, rules);
        if !keep {
            info!("Dropping {} which does not match any dstPath -> {}", kind, path);
        }
        keep
    });
    before - items.len()
}
