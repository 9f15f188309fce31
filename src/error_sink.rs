//! Per-view parse/format failure reporting
//!
//! A view whose SQL cannot be parsed or re-formatted is dropped from the
//! output; its failure and raw SQL go to an [`ErrorSink`] and the run goes on.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error};

use crate::catalog::CatalogPath;
use crate::error::MigrationError;
use crate::sql::SqlFailure;

const SECTION_RULE: &str = "-----";
const CAUSES_RULE: &str = "--------------------";

/// A failed view together with everything needed to report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFailure {
    pub view_path: CatalogPath,
    pub failure: SqlFailure,
    /// SQL text as stored in the catalog, before any normalization
    pub sql: String,
}

impl ViewFailure {
    pub fn new(view_path: CatalogPath, failure: SqlFailure, sql: impl Into<String>) -> Self {
        Self {
            view_path,
            failure,
            sql: sql.into(),
        }
    }

    /// Human readable diagnostic written next to the failing SQL.
    pub fn report(&self) -> String {
        let line = self
            .failure
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let mut out = String::new();
        let _ = write!(out, "View:\n{}\n\n{}\n", self.view_path, SECTION_RULE);
        let _ = write!(
            out,
            "Message:\n{}\n\n{}\n",
            self.failure.message, SECTION_RULE
        );
        let _ = write!(out, "Line:\n{}\n\n", line);
        let _ = writeln!(out, "\n{}", CAUSES_RULE);
        for cause in &self.failure.causes {
            let _ = writeln!(out, "{}", cause);
        }
        out
    }
}

/// Destination of per-view failures
pub trait ErrorSink {
    /// Record one failure. An `Err` aborts the run.
    fn record(&mut self, failure: ViewFailure) -> Result<()>;

    /// Number of failures recorded so far.
    fn count(&self) -> usize;
}

/// Writes `error_N.txt` and `error_N.sql` (N starting at 1) into a directory
/// that is created on the first failure.
#[derive(Debug)]
pub struct DirectoryErrorSink {
    directory: PathBuf,
    count: usize,
}

impl DirectoryErrorSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            count: 0,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl ErrorSink for DirectoryErrorSink {
    fn record(&mut self, failure: ViewFailure) -> Result<()> {
        error!(
            "Dropping view {}: {}",
            failure.view_path, failure.failure
        );

        if self.count == 0 {
            fs::create_dir_all(&self.directory).map_err(|e| MigrationError::ErrorSinkWriteError {
                path: self.directory.clone(),
                source: e,
            })?;
        }
        let index = self.count + 1;

        let report_path = self.directory.join(format!("error_{}.txt", index));
        write_file(&report_path, &failure.report())?;
        let sql_path = self.directory.join(format!("error_{}.sql", index));
        write_file(&sql_path, &failure.sql)?;

        debug!("Wrote {} and {}", report_path.display(), sql_path.display());
        self.count = index;
        Ok(())
    }

    fn count(&self) -> usize {
        self.count
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| {
        MigrationError::ErrorSinkWriteError {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

/// Keeps failures in memory; used by library callers and tests.
#[derive(Debug, Default)]
pub struct MemoryErrorSink {
    pub failures: Vec<ViewFailure>,
}

impl MemoryErrorSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorSink for MemoryErrorSink {
    fn record(&mut self, failure: ViewFailure) -> Result<()> {
        error!(
            "Dropping view {}: {}",
            failure.view_path, failure.failure
        );
        self.failures.push(failure);
        Ok(())
    }

    fn count(&self) -> usize {
        self.failures.len()
    }
}
