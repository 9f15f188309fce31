//! View SQL: parsing, reference rewriting, quoting and formatting

mod comments;
mod failure;
mod format;
mod parse;
mod quoting;
mod rewrite;

pub use comments::normalize_comments;
pub use failure::{SqlFailure, SqlFailureKind};
pub use format::{format_statement, reindent};
pub use parse::parse_view_sql;
pub use quoting::{apply_quoting, needs_quoting};
pub use rewrite::{rewrite_references, Clause, ReferenceRewriter, RewriteStats};
