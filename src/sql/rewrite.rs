//! Rewriting of path-prefixed object references inside a parsed query
//!
//! The rewriter is a [`VisitorMut`], so it reaches every relation and every
//! expression of a query, whatever clause holds it: `FROM` and `JOIN`
//! relations, set-operation branches, CTEs, derived tables and sub-queries
//! nested anywhere in an expression (`WHERE`, `ON`, `ORDER BY`, `GROUP BY`,
//! `ANY (...)`, function arguments and so on).
//!
//! A reference matches when its leading identifiers equal the rule's source
//! segments, compared case-insensitively. The matched identifiers are replaced
//! by the destination segments; the remaining identifiers keep their
//! spelling and quoting. The visitor reaches each node once, so a reference
//! is never rewritten twice by the same rule.
//!
//! Column references (`Space.Folder.View.col`, `Space.Folder.View.*`) are
//! rewritten too, unless their first identifier is a table alias, CTE name or
//! unaliased table name visible from the query they appear in.

use std::fmt;
use std::ops::ControlFlow;

use sqlparser::ast::{
    Expr, Ident, ObjectName, Query, SelectItem, SetExpr, Statement, TableFactor, TableWithJoins,
    VisitMut, VisitorMut,
};
use tracing::{info, warn};

use crate::catalog::{CatalogPath, MigrationRule};

/// Clause a reference was found in, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    From,
    Join,
    Union,
    Subquery,
    Value,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Clause::From => "FROM",
            Clause::Join => "JOIN",
            Clause::Union => "UNION",
            Clause::Subquery => "SUBQUERY",
            Clause::Value => "VALUE",
        };
        f.write_str(label)
    }
}

/// Counters collected while rewriting one statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// References replaced
    pub replaced: usize,
    /// Statements skipped because they are not queries
    pub unrecognized: usize,
}

impl std::ops::AddAssign for RewriteStats {
    fn add_assign(&mut self, other: Self) {
        self.replaced += other.replaced;
        self.unrecognized += other.unrecognized;
    }
}

/// Names introduced by one query level
#[derive(Debug, Default)]
struct Scope {
    /// Identifiers a column qualifier may refer to
    qualifiers: Vec<String>,
    ctes: Vec<String>,
    /// Relations of this level, dotted, in visit order
    relations: Vec<(String, Clause)>,
    set_operation: bool,
}

impl Scope {
    fn for_query(query: &Query) -> Self {
        let mut scope = Scope::default();
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                scope.ctes.push(cte.alias.name.value.clone());
                scope.qualifiers.push(cte.alias.name.value.clone());
            }
        }
        scope.collect_set_expr(&query.body);
        scope
    }

    fn collect_set_expr(&mut self, body: &SetExpr) {
        match body {
            SetExpr::Select(select) => {
                for table in &select.from {
                    self.collect_table_with_joins(table, Clause::From);
                }
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.set_operation = true;
                self.collect_set_expr(left);
                self.collect_set_expr(right);
            }
            // Nested queries open their own scope
            _ => {}
        }
    }

    fn collect_table_with_joins(&mut self, table: &TableWithJoins, clause: Clause) {
        self.collect_factor(&table.relation, clause);
        for join in &table.joins {
            self.collect_factor(&join.relation, Clause::Join);
        }
    }

    fn collect_factor(&mut self, factor: &TableFactor, clause: Clause) {
        let alias = match factor {
            TableFactor::Table { name, alias, .. } => {
                self.relations.push((dotted(&name.0), clause));
                // `Prod.Sales.Orders` can be referred to as `Orders`
                if alias.is_none() && name.0.len() > 1 {
                    if let Some(last) = name.0.last() {
                        self.qualifiers.push(last.value.clone());
                    }
                }
                alias.as_ref()
            }
            TableFactor::NestedJoin {
                table_with_joins,
                alias,
            } => {
                self.collect_table_with_joins(table_with_joins, clause);
                alias.as_ref()
            }
            TableFactor::Pivot { table, alias, .. }
            | TableFactor::Unpivot { table, alias, .. }
            | TableFactor::MatchRecognize { table, alias, .. } => {
                self.collect_factor(table, clause);
                alias.as_ref()
            }
            TableFactor::Derived { alias, .. }
            | TableFactor::TableFunction { alias, .. }
            | TableFactor::Function { alias, .. }
            | TableFactor::UNNEST { alias, .. }
            | TableFactor::JsonTable { alias, .. }
            | TableFactor::OpenJsonTable { alias, .. } => alias.as_ref(),
        };
        if let Some(alias) = alias {
            self.qualifiers.push(alias.name.value.clone());
        }
    }

    /// Clause of the next visit of `relation` at this level.
    fn take_relation(&mut self, relation: &str) -> Clause {
        match self.relations.iter().position(|(name, _)| name == relation) {
            Some(index) => self.relations.remove(index).1,
            None => Clause::From,
        }
    }
}

/// Applies one migration rule to the references of one view's query.
pub struct ReferenceRewriter<'a> {
    rule: &'a MigrationRule,
    view_path: &'a CatalogPath,
    origin: &'a str,
    stats: RewriteStats,
    scopes: Vec<Scope>,
}

impl<'a> ReferenceRewriter<'a> {
    /// `view_path` and `origin` only label the log lines.
    pub fn new(rule: &'a MigrationRule, view_path: &'a CatalogPath, origin: &'a str) -> Self {
        Self {
            rule,
            view_path,
            origin,
            stats: RewriteStats::default(),
            scopes: Vec::new(),
        }
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    pub fn rewrite_statement(&mut self, statement: &mut Statement) -> RewriteStats {
        if matches!(statement, Statement::Query(_)) {
            let _ = statement.visit(self);
        } else {
            self.stats.unrecognized += 1;
            warn!(
                "{} - Unhandled statement in view {}, left unmodified: {}",
                self.origin, self.view_path, statement
            );
        }
        self.stats
    }

    fn relation_clause(&mut self, relation: &ObjectName) -> Clause {
        let nested = self.scopes.len() > 1;
        match self.scopes.last_mut() {
            None => Clause::From,
            Some(_) if nested => Clause::Subquery,
            Some(scope) if scope.set_operation => Clause::Union,
            Some(scope) => scope.take_relation(&dotted(&relation.0)),
        }
    }

    fn is_cte(&self, relation: &ObjectName) -> bool {
        match relation.0.as_slice() {
            [name] => self
                .scopes
                .iter()
                .flat_map(|scope| scope.ctes.iter())
                .any(|cte| cte.eq_ignore_ascii_case(&name.value)),
            _ => false,
        }
    }

    fn is_local_qualifier(&self, ident: &Ident) -> bool {
        self.scopes
            .iter()
            .flat_map(|scope| scope.qualifiers.iter())
            .any(|name| name.eq_ignore_ascii_case(&ident.value))
    }

    /// Rewrite a column reference whose leading `qualifier_len` identifiers
    /// name a table.
    fn rewrite_qualified(&mut self, parts: &mut Vec<Ident>, qualifier_len: usize) {
        if qualifier_len < self.rule.src_path.len() {
            return;
        }
        let local = parts
            .first()
            .map_or(true, |first| self.is_local_qualifier(first));
        if !local {
            self.rewrite_reference(parts, Clause::Value);
        }
    }

    /// `t.*` items of the selects that make up `body`
    fn rewrite_wildcards(&mut self, body: &mut SetExpr) {
        match body {
            SetExpr::Select(select) => {
                for item in &mut select.projection {
                    if let SelectItem::QualifiedWildcard(prefix, _) = item {
                        let len = prefix.0.len();
                        self.rewrite_qualified(&mut prefix.0, len);
                    }
                }
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.rewrite_wildcards(left);
                self.rewrite_wildcards(right);
            }
            _ => {}
        }
    }

    /// Replace the source prefix of a multi-part name with the destination.
    fn rewrite_reference(&mut self, parts: &mut Vec<Ident>, clause: Clause) {
        let src = self.rule.src_path.segments();
        let matches = parts.len() >= src.len()
            && parts
                .iter()
                .zip(src)
                .all(|(ident, segment)| ident.value.eq_ignore_ascii_case(segment));
        if !matches {
            return;
        }

        let old = dotted(parts);
        let suffix = parts.split_off(src.len());
        *parts = self
            .rule
            .dst_path
            .segments()
            .iter()
            .map(|segment| Ident::new(segment.as_str()))
            .chain(suffix)
            .collect();
        self.stats.replaced += 1;

        info!(
            "{} - Matching view SQL {} ({}): {} -> {}",
            self.origin,
            clause,
            self.view_path,
            old,
            dotted(parts)
        );
    }
}

impl VisitorMut for ReferenceRewriter<'_> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        self.scopes.push(Scope::for_query(query));
        self.rewrite_wildcards(&mut query.body);
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &mut Query) -> ControlFlow<Self::Break> {
        self.scopes.pop();
        ControlFlow::Continue(())
    }

    fn pre_visit_relation(&mut self, relation: &mut ObjectName) -> ControlFlow<Self::Break> {
        let clause = self.relation_clause(relation);
        if !self.is_cte(relation) {
            self.rewrite_reference(&mut relation.0, clause);
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &mut Expr) -> ControlFlow<Self::Break> {
        match expr {
            Expr::CompoundIdentifier(parts) => {
                let len = parts.len().saturating_sub(1);
                self.rewrite_qualified(parts, len);
            }
            Expr::QualifiedWildcard(prefix, _) => {
                let len = prefix.0.len();
                self.rewrite_qualified(&mut prefix.0, len);
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

/// Rewrite every reference to `rule.src_path` in `statement`.
pub fn rewrite_references(
    statement: &mut Statement,
    rule: &MigrationRule,
    view_path: &CatalogPath,
    origin: &str,
) -> RewriteStats {
    ReferenceRewriter::new(rule, view_path, origin).rewrite_statement(statement)
}

fn dotted(parts: &[Ident]) -> String {
    parts
        .iter()
        .map(|ident| ident.value.as_str())
        .collect::<Vec<_>>()
        .join(".")
}
