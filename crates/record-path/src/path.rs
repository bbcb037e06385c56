//! Dotted field paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolve::path_or;

/// Segment separator inside a field path.
const SEPARATOR: char = '.';

/// A dot-separated path into a nested record.
///
/// The raw text is kept alongside the split segments so the path can be
/// echoed back verbatim (for example in validation messages).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path. Never fails; an empty string has no segments.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(SEPARATOR).map(str::to_string).collect()
        };
        Self { raw, segments }
    }

    /// The path exactly as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The individual keys, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns true if the path addresses a nested value.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Resolves this path in `record`, falling back to `default`.
    pub fn resolve_or<'a>(&self, record: &'a Value, default: &'a Value) -> &'a Value {
        path_or(default, &self.segments, record)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for FieldPath {
    fn from(raw: String) -> Self {
        FieldPath::parse(raw)
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        FieldPath::parse(raw)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}
