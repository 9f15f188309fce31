//! Namespace paths and migration rules
//!
//! Every catalog entity is identified by a [`CatalogPath`]: an ordered list of
//! case-sensitive segments. A space is a one-segment path, nested folders and
//! datasets grow it by one segment per level.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered, case-sensitive sequence of namespace segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogPath(Vec<String>);

impl CatalogPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First segment (the space name for well-formed paths).
    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Path of the containing space or folder.
    pub fn parent(&self) -> CatalogPath {
        match self.0.split_last() {
            Some((_, parent)) => Self(parent.to_vec()),
            None => Self::default(),
        }
    }

    /// First `len` segments (or the whole path when it is shorter).
    pub fn truncated(&self, len: usize) -> CatalogPath {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// True iff `self` is no longer than `other` and every segment of `self`
    /// equals the corresponding segment of `other`.
    pub fn is_prefix_of(&self, other: &CatalogPath) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// True iff the two paths agree over their overlapping length, whichever
    /// of them is longer.
    pub fn overlaps(&self, other: &CatalogPath) -> bool {
        self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// Dotted form used for SQL references (`Space.Folder.View`).
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    /// Slash-joined form used by dataset dependency records.
    pub fn slashed(&self) -> String {
        self.0.join("/")
    }
}

impl fmt::Display for CatalogPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl From<Vec<String>> for CatalogPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for CatalogPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

/// A source-prefix to destination-prefix remapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRule {
    pub src_path: CatalogPath,
    pub dst_path: CatalogPath,
}

impl MigrationRule {
    pub fn new(src_path: CatalogPath, dst_path: CatalogPath) -> Self {
        Self { src_path, dst_path }
    }

    /// Replace the first `len(src)` segments of `path` with `dst`.
    ///
    /// Callers check `src.is_prefix_of(path)` first; the leading segments are
    /// dropped unconditionally.
    pub fn rebuild(&self, path: &CatalogPath) -> CatalogPath {
        let skip = self.src_path.len().min(path.len());
        let mut segments = self.dst_path.0.clone();
        segments.extend_from_slice(&path.0[skip..]);
        CatalogPath(segments)
    }

    /// Rebuild a SQL context path. A context at or above `src` collapses to
    /// `dst` cut to the context's own depth.
    pub fn rebuild_context(&self, context: &CatalogPath) -> CatalogPath {
        if self.src_path.len() >= context.len() {
            self.dst_path.truncated(context.len())
        } else {
            self.rebuild(context)
        }
    }
}

impl fmt::Display for MigrationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src_path, self.dst_path)
    }
}
