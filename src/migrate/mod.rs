//! Migration pipeline: rule application, pruning and tree reconciliation

mod apply;
mod prune;
mod reconcile;

pub use apply::{apply_container_rule, apply_source_rule, CONTAINER_MIGRATION, SOURCE_MIGRATION};
pub use prune::{in_destination_scope, prune_catalog};
pub use reconcile::reconcile_tree;

use anyhow::Result;
use tracing::{debug, info};

use crate::catalog::{Catalog, MigrationRule};
use crate::error_sink::{ErrorSink, ViewFailure};
use crate::sql::{format_statement, parse_view_sql};

/// Ordered rule lists of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Space/folder rules: move entities and rewrite the SQL of moved views
    pub container_rules: Vec<MigrationRule>,
    /// Source rules: rewrite references in every view, move nothing
    pub source_rules: Vec<MigrationRule>,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub views_parsed: usize,
    pub parse_failures: usize,
    pub format_failures: usize,
    pub views_written: usize,
    pub entities_dropped: usize,
    pub folders_synthesized: usize,
    pub references_rewritten: usize,
    pub unrecognized_shapes: usize,
}

/// Run the whole migration on an in-memory catalog.
///
/// Views whose SQL fails to parse or format are removed from the catalog and
/// handed to `sink`. Structural errors (a missing space) abort the run.
pub fn migrate_catalog(
    catalog: &mut Catalog,
    plan: &MigrationPlan,
    sink: &mut dyn ErrorSink,
) -> Result<MigrationSummary> {
    let mut summary = MigrationSummary::default();

    catalog.retain_migratable_containers();
    parse_views(catalog, sink, &mut summary)?;

    if !plan.container_rules.is_empty() {
        for rule in &plan.container_rules {
            info!("{}: {}", CONTAINER_MIGRATION, rule);
            let stats = apply_container_rule(catalog, rule);
            summary.references_rewritten += stats.replaced;
            summary.unrecognized_shapes += stats.unrecognized;
        }
        summary.entities_dropped = prune_catalog(catalog, &plan.container_rules);
        summary.folders_synthesized = reconcile_tree(catalog)?;
    }

    for rule in &plan.source_rules {
        info!("{}: {}", SOURCE_MIGRATION, rule);
        let stats = apply_source_rule(catalog, rule);
        summary.references_rewritten += stats.replaced;
        summary.unrecognized_shapes += stats.unrecognized;
    }

    format_views(catalog, sink, &mut summary)?;
    catalog.clear_physical_entities();

    Ok(summary)
}

fn parse_views(
    catalog: &mut Catalog,
    sink: &mut dyn ErrorSink,
    summary: &mut MigrationSummary,
) -> Result<()> {
    for mut view in std::mem::take(&mut catalog.views) {
        debug!("Parsing SQL of view {}", view.path);
        match parse_view_sql(&view.sql) {
            Ok(statement) => {
                view.query = Some(statement);
                summary.views_parsed += 1;
                catalog.views.push(view);
            }
            Err(failure) => {
                summary.parse_failures += 1;
                sink.record(ViewFailure::new(view.path, failure, view.sql))?;
            }
        }
    }
    info!(
        "Parsed {} views, {} failed",
        summary.views_parsed, summary.parse_failures
    );
    Ok(())
}

fn format_views(
    catalog: &mut Catalog,
    sink: &mut dyn ErrorSink,
    summary: &mut MigrationSummary,
) -> Result<()> {
    for mut view in std::mem::take(&mut catalog.views) {
        let formatted = match view.query.take() {
            Some(mut statement) => format_statement(&mut statement),
            None => Ok(view.sql.clone()),
        };
        match formatted {
            Ok(sql) => {
                view.sql = sql;
                summary.views_written += 1;
                catalog.views.push(view);
            }
            Err(failure) => {
                summary.format_failures += 1;
                sink.record(ViewFailure::new(view.path, failure, view.sql))?;
            }
        }
    }
    info!(
        "Formatted {} views, {} failed",
        summary.views_written, summary.format_failures
    );
    Ok(())
}
