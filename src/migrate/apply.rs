//! Application of one migration rule across every entity kind

use tracing::info;

use crate::catalog::{Catalog, DependencyRecord, MigrationRule};
use crate::sql::{rewrite_references, RewriteStats};
use crate::util::replace_prefix_ci;

/// Log label of space/folder migrations
pub const CONTAINER_MIGRATION: &str = "Space/folder migration";
/// Log label of source migrations
pub const SOURCE_MIGRATION: &str = "Source migration";

/// Apply a space/folder rule to containers, spaces, folders, reflections,
/// tags, dependency records, views and wikis, in that order.
///
/// Moved spaces and folders lose their children; the reconciler rebuilds
/// them once all rules have run.
pub fn apply_container_rule(catalog: &mut Catalog, rule: &MigrationRule) -> RewriteStats {
    let src = &rule.src_path;
    let mut stats = RewriteStats::default();

    for container in &mut catalog.containers {
        let len = container.path.len().min(rule.dst_path.len());
        if container.path.truncated(len) == src.truncated(len) {
            let new_path = rule.dst_path.truncated(len);
            info!("Matching container: {} -> {}", container.path, new_path);
            container.path = new_path;
        }
    }

    if let (Some(src_space), Some(dst_space)) = (src.root(), rule.dst_path.root()) {
        for space in &mut catalog.spaces {
            if space.name == src_space {
                info!("Matching space: {} -> {}", space.name, dst_space);
                space.name = dst_space.to_string();
                space.children.clear();
            }
        }
    }

    for folder in &mut catalog.folders {
        if src.is_prefix_of(&folder.path) {
            let new_path = rule.rebuild(&folder.path);
            info!("Matching folder: {} -> {}", folder.path, new_path);
            folder.path = new_path;
            folder.children.clear();
        }
    }

    for reflection in &mut catalog.reflections {
        if src.is_prefix_of(&reflection.path) {
            let new_path = rule.rebuild(&reflection.path);
            info!(
                "Matching reflection ({}): {} -> {}",
                reflection.name, reflection.path, new_path
            );
            reflection.path = new_path;
        }
    }

    for tag in &mut catalog.tags {
        if src.is_prefix_of(&tag.path) {
            let new_path = rule.rebuild(&tag.path);
            info!("Matching tag: {} -> {}", tag.path, new_path);
            tag.path = new_path;
        }
    }

    for record in &mut catalog.dependencies {
        if src.is_prefix_of(&record.path) {
            let new_path = rule.rebuild(&record.path);
            info!("Matching dependency record: {} -> {}", record.path, new_path);
            record.path = new_path;
            rewrite_parents(record, rule);
        }
    }

    for view in &mut catalog.views {
        if let Some(context) = view.sql_context.as_mut() {
            if !context.is_empty() && src.overlaps(context) {
                let new_context = rule.rebuild_context(context);
                info!("Matching view SQL context: {} -> {}", context, new_context);
                *context = new_context;
            }
        }
        if src.is_prefix_of(&view.path) {
            let new_path = rule.rebuild(&view.path);
            info!("Matching view path: {} -> {}", view.path, new_path);
            view.path = new_path;
            if let Some(query) = view.query.as_mut() {
                stats += rewrite_references(query, rule, &view.path, CONTAINER_MIGRATION);
            }
        }
    }

    for wiki in &mut catalog.wikis {
        if src.is_prefix_of(&wiki.path) {
            let new_path = rule.rebuild(&wiki.path);
            info!("Matching wiki: {} -> {}", wiki.path, new_path);
            wiki.path = new_path;
        }
    }

    stats
}

/// Apply a source rule: every view's SQL and every dependency record's
/// parent references are rewritten, whatever the entity's own path.
pub fn apply_source_rule(catalog: &mut Catalog, rule: &MigrationRule) -> RewriteStats {
    let mut stats = RewriteStats::default();

    for view in &mut catalog.views {
        if let Some(context) = view.sql_context.as_mut() {
            if rule.src_path.is_prefix_of(context) {
                let new_context = rule.rebuild(context);
                info!(
                    "{} - Matching view SQL context ({}): {} -> {}",
                    SOURCE_MIGRATION, view.path, context, new_context
                );
                *context = new_context;
            }
        }
        if let Some(query) = view.query.as_mut() {
            stats += rewrite_references(query, rule, &view.path, SOURCE_MIGRATION);
        }
    }

    for record in &mut catalog.dependencies {
        rewrite_parents(record, rule);
    }

    stats
}

/// Replace the slash-joined source prefix of each parent reference.
fn rewrite_parents(record: &mut DependencyRecord, rule: &MigrationRule) {
    let src = rule.src_path.slashed();
    let dst = rule.dst_path.slashed();
    for parent in &mut record.parents {
        if let Some(replaced) = replace_prefix_ci(parent, &src, &dst) {
            info!(
                "Matching dependency of {}: {} -> {}",
                record.path, parent, replaced
            );
            *parent = replaced;
        }
    }
}
