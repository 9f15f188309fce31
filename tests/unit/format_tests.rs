//! Unit tests for view SQL parsing, quoting and formatting

use catalog_migrate::sql::{
    format_statement, needs_quoting, parse_view_sql, reindent, SqlFailureKind,
};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_accepts_mixed_comment_styles() {
    let sql = "/* header\n   spanning lines */\nSELECT id, // key\n  name -- label\nFROM Prod.Sales.Customers";
    let mut statement = parse_view_sql(sql).unwrap();
    let formatted = format_statement(&mut statement).unwrap();
    assert_eq!(formatted, "SELECT id, name\nFROM Prod.Sales.Customers");
}

#[test]
fn test_parse_failure_kind_and_line() {
    let err = parse_view_sql("SELECT *\nFROM t\nWHERE a = = 1").unwrap_err();
    assert_eq!(err.kind, SqlFailureKind::Parse);
    assert_eq!(err.line, Some(3));
}

// ============================================================================
// Quoting
// ============================================================================

#[test]
fn test_quoting_verdict_is_a_function_of_the_text() {
    let cases = [
        ("day", false),
        ("Day", false),
        ("order", true),
        ("KEY", true),
        ("3rd", true),
        ("net_total", true),
        ("Région", false),
        ("Revenue2024", false),
    ];
    for (ident, expected) in cases {
        assert_eq!(needs_quoting(ident), expected, "{}", ident);
        assert_eq!(needs_quoting(ident), needs_quoting(ident));
    }
}

#[test]
fn test_format_quotes_only_what_needs_it() {
    let mut statement = parse_view_sql(
        r#"SELECT "id", "net_total", t."index" FROM "Prod"."Sales EU"."2024" AS t"#,
    )
    .unwrap();
    let formatted = format_statement(&mut statement).unwrap();
    assert_eq!(
        formatted,
        "SELECT id, \"net_total\", t.\"index\"\nFROM Prod.\"Sales EU\".\"2024\" AS t"
    );
}

// ============================================================================
// Re-indentation
// ============================================================================

#[test]
fn test_nested_subqueries_indent_per_level() {
    let out = reindent(
        "SELECT a FROM (SELECT a FROM (SELECT a FROM t WHERE a > 0) AS x WHERE a < 9) AS y",
    )
    .unwrap();
    assert_eq!(
        out,
        "SELECT a\nFROM (SELECT a\n  FROM (SELECT a\n    FROM t\n    WHERE a > 0) AS x\n  WHERE a < 9) AS y"
    );
}

#[test]
fn test_reindent_is_stable() {
    let once = reindent("SELECT a FROM t WHERE a IN (SELECT b FROM u) ORDER BY a LIMIT 5").unwrap();
    let twice = reindent(&once).unwrap();
    assert_eq!(once, twice);
}
