//! Recoverable per-view SQL failures

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Line:\s*(\d+)").expect("Invalid line regex"));

/// Stage at which a view's SQL failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFailureKind {
    Parse,
    Format,
}

impl fmt::Display for SqlFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlFailureKind::Parse => f.write_str("parse"),
            SqlFailureKind::Format => f.write_str("format"),
        }
    }
}

/// A view whose SQL could not be parsed or re-serialized.
///
/// These never abort a run: the view is dropped and the failure is handed to
/// an [`ErrorSink`](crate::error_sink::ErrorSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("SQL {kind} error: {message}")]
pub struct SqlFailure {
    pub kind: SqlFailureKind,
    pub message: String,
    /// 1-based line in the SQL handed to the parser, when the parser reported one
    pub line: Option<usize>,
    /// Messages of the underlying errors, outermost first
    pub causes: Vec<String>,
}

impl SqlFailure {
    /// Build a failure from an error and its `source()` chain.
    pub fn from_error(kind: SqlFailureKind, err: &(dyn std::error::Error + 'static)) -> Self {
        let message = err.to_string();
        let line = extract_line_from_error(&message);

        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            kind,
            message,
            line,
            causes,
        }
    }

    pub fn new(kind: SqlFailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            line: extract_line_from_error(&message),
            message,
            causes: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        if self.line.is_none() {
            self.line = extract_line_from_error(&cause);
        }
        self.causes.push(cause);
        self
    }
}

/// Extract line number from sqlparser error message (format: "... at Line: X, Column: Y")
fn extract_line_from_error(error_msg: &str) -> Option<usize> {
    let caps = LINE_RE.captures(error_msg)?;
    caps.get(1)?.as_str().parse().ok()
}
