//! Identifier quoting policy applied before a statement is rendered

use std::ops::ControlFlow;

use sqlparser::ast::{Expr, Ident, ObjectName, Statement, TableFactor, VisitMut, VisitorMut};
use tracing::warn;

/// Identifiers that collide with keywords of the target engine.
const ALWAYS_QUOTED: &[&str] = &["default", "key", "index", "join", "from", "both", "order"];

/// Decide whether `identifier` must be double-quoted when rendered.
///
/// The verdict depends on the identifier text only.
pub fn needs_quoting(identifier: &str) -> bool {
    if identifier == "day" {
        // TIMESTAMPDIFF(day, ...) breaks when its unit is quoted, so a column
        // called `day` stays unquoted too.
        warn!(
            "Identifier 'day' is left unquoted because it doubles as a TIMESTAMPDIFF unit; \
             rename the column if it is not meant as a unit"
        );
        return false;
    }
    if ALWAYS_QUOTED
        .iter()
        .any(|reserved| identifier.eq_ignore_ascii_case(reserved))
    {
        return true;
    }
    match identifier.chars().next() {
        None => true,
        Some(first) if first.is_numeric() => true,
        Some(_) => !identifier.chars().all(char::is_alphanumeric),
    }
}

/// Set the quote style of every relation name, column identifier and table
/// alias in `statement` according to [`needs_quoting`].
pub fn apply_quoting(statement: &mut Statement) {
    let _ = statement.visit(&mut QuotingVisitor);
}

fn quote(ident: &mut Ident) {
    ident.quote_style = if needs_quoting(&ident.value) {
        Some('"')
    } else {
        None
    };
}

struct QuotingVisitor;

impl VisitorMut for QuotingVisitor {
    type Break = ();

    fn pre_visit_relation(&mut self, relation: &mut ObjectName) -> ControlFlow<Self::Break> {
        relation.0.iter_mut().for_each(quote);
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(
        &mut self,
        table_factor: &mut TableFactor,
    ) -> ControlFlow<Self::Break> {
        match table_factor {
            TableFactor::Table {
                alias: Some(alias), ..
            }
            | TableFactor::Derived {
                alias: Some(alias), ..
            } => quote(&mut alias.name),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match expr {
            Expr::Identifier(ident) => quote(ident),
            Expr::CompoundIdentifier(parts) => parts.iter_mut().for_each(quote),
            _ => {}
        }
        ControlFlow::Continue(())
    }
}
