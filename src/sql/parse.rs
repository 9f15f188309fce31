//! View SQL parsing using sqlparser-rs

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::comments::normalize_comments;
use super::failure::{SqlFailure, SqlFailureKind};

/// Parse the SQL text of a view into a single statement.
///
/// Comments are normalized first (see [`normalize_comments`]); line numbers in
/// the returned failure refer to the normalized text.
pub fn parse_view_sql(sql: &str) -> Result<Statement, SqlFailure> {
    let normalized = normalize_comments(sql);
    parse_single_statement(&normalized, SqlFailureKind::Parse)
}

pub(crate) fn parse_single_statement(
    sql: &str,
    kind: SqlFailureKind,
) -> Result<Statement, SqlFailure> {
    let dialect = GenericDialect {};
    let mut statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| SqlFailure::from_error(kind, &e))?;

    match statements.len() {
        1 => Ok(statements.remove(0)),
        0 => Err(SqlFailure::new(kind, "SQL contains no statement")),
        n => Err(SqlFailure::new(
            kind,
            format!("SQL contains {} statements, expected exactly one", n),
        )),
    }
}
