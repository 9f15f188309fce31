//! Rendering rewritten statements back to SQL text

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token, TokenWithSpan, Tokenizer};

use super::failure::{SqlFailure, SqlFailureKind};
use super::parse::parse_single_statement;
use super::quoting::apply_quoting;

const INDENT_WIDTH: usize = 2;

/// Quote, render and re-indent `statement`.
///
/// The result must parse back into a single statement, otherwise the view is
/// reported as a format failure.
pub fn format_statement(statement: &mut Statement) -> Result<String, SqlFailure> {
    apply_quoting(statement);
    let rendered = statement.to_string();
    let formatted = reindent(&rendered)?;

    parse_single_statement(&formatted, SqlFailureKind::Format).map_err(|err| {
        SqlFailure::new(SqlFailureKind::Format, "Formatted SQL does not parse back")
            .with_cause(err.message)
    })?;

    Ok(formatted)
}

/// Put every clause of a query on its own line.
///
/// Only whitespace between tokens changes. Clauses of a sub-query are
/// indented by one level per enclosing sub-query; parenthesized expressions
/// such as `OVER (ORDER BY ...)` or `EXTRACT(YEAR FROM ...)` stay inline.
pub fn reindent(sql: &str) -> Result<String, SqlFailure> {
    let dialect = GenericDialect {};
    let tokens: Vec<TokenWithSpan> = Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| SqlFailure::from_error(SqlFailureKind::Format, &e))?
        .into_iter()
        .filter(|t| !matches!(t.token, Token::Whitespace(_)))
        .collect();
    let line_offsets = compute_line_offsets(sql);

    // One entry per open parenthesis: true when it opens a sub-query
    let mut parens: Vec<bool> = Vec::new();
    let mut breaks: Vec<(usize, usize)> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match &token.token {
            Token::LParen => parens.push(false),
            Token::RParen => {
                parens.pop();
            }
            Token::Word(word) if i > 0 => {
                let prev = &tokens[i - 1].token;
                if matches!(prev, Token::LParen)
                    && matches!(word.keyword, Keyword::SELECT | Keyword::WITH)
                {
                    if let Some(top) = parens.last_mut() {
                        *top = true;
                    }
                    continue;
                }

                let in_query = parens.last().copied().unwrap_or(true);
                let next = tokens.get(i + 1).map(|t| &t.token);
                if in_query && starts_clause(word.keyword, prev, next) {
                    let depth = parens.iter().filter(|is_query| **is_query).count();
                    let offset = location_to_byte_offset(sql, &line_offsets, &token.span.start);
                    breaks.push((offset, depth));
                }
            }
            _ => {}
        }
    }

    let mut out = String::with_capacity(sql.len() + breaks.len() * (INDENT_WIDTH + 1));
    let mut last = 0;
    for (offset, depth) in breaks {
        out.push_str(sql[last..offset].trim_end());
        out.push('\n');
        out.push_str(&" ".repeat(depth * INDENT_WIDTH));
        last = offset;
    }
    out.push_str(&sql[last..]);

    Ok(out)
}

fn starts_clause(keyword: Keyword, prev: &Token, next: Option<&Token>) -> bool {
    let next_keyword = match next {
        Some(Token::Word(w)) => w.keyword,
        _ => Keyword::NoKeyword,
    };
    let prev_keyword = match prev {
        Token::Word(w) => w.keyword,
        _ => Keyword::NoKeyword,
    };

    match keyword {
        Keyword::SELECT
        | Keyword::FROM
        | Keyword::WHERE
        | Keyword::HAVING
        | Keyword::LIMIT
        | Keyword::OFFSET
        | Keyword::UNION
        | Keyword::EXCEPT
        | Keyword::INTERSECT
        | Keyword::INNER
        | Keyword::CROSS
        | Keyword::NATURAL => true,
        Keyword::GROUP | Keyword::ORDER => next_keyword == Keyword::BY,
        // LEFT(...) and RIGHT(...) are also string functions
        Keyword::LEFT | Keyword::RIGHT | Keyword::FULL => {
            matches!(next_keyword, Keyword::JOIN | Keyword::OUTER)
        }
        Keyword::JOIN => !matches!(
            prev_keyword,
            Keyword::LEFT
                | Keyword::RIGHT
                | Keyword::FULL
                | Keyword::INNER
                | Keyword::CROSS
                | Keyword::OUTER
                | Keyword::NATURAL
        ),
        _ => false,
    }
}

/// Byte offset of the start of each line.
fn compute_line_offsets(sql: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    offsets.extend(sql.match_indices('\n').map(|(i, _)| i + 1));
    offsets
}

/// Convert a (1-based line, 1-based column) Location to a byte offset.
///
/// Columns count characters, not bytes.
fn location_to_byte_offset(sql: &str, line_offsets: &[usize], location: &Location) -> usize {
    let line = location.line as usize;
    if line == 0 || line > line_offsets.len() {
        return 0;
    }
    let line_start = line_offsets[line - 1];
    let column = (location.column as usize).saturating_sub(1);
    sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)
        .unwrap_or(sql.len())
}
