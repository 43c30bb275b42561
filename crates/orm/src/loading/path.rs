//! Relation path parsing for `with(...)` arguments
//!
//! A path is a `.`-separated list of segments; each segment is a relation
//! name optionally followed by `:` and a comma-separated field projection:
//! `orders:id,total.items`.

use std::fmt;

/// One level of a relation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSegment {
    pub name: String,
    /// Projection for this level; empty means every column
    pub fields: Vec<String>,
}

impl RelationSegment {
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, fields) = match raw.split_once(':') {
            Some((name, fields)) => (name, fields),
            None => (raw, ""),
        };
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let fields: Vec<String> = fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect();
        let fields = if fields.iter().any(|field| field == "*") {
            Vec::new()
        } else {
            fields
        };

        Some(Self {
            name: name.to_string(),
            fields,
        })
    }

    pub fn has_projection(&self) -> bool {
        !self.fields.is_empty()
    }
}

impl fmt::Display for RelationSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.fields.join(","))
        }
    }
}

/// A parsed `with(...)` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPath {
    segments: Vec<RelationSegment>,
}

impl RelationPath {
    /// Parse a path; empty segments are skipped, so `"orders..items"` equals
    /// `"orders.items"`. Returns `None` when no segment remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let segments: Vec<RelationSegment> = raw.split('.').filter_map(RelationSegment::parse).collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Parse every argument, dropping the ones that hold no segment
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
        raw.iter().filter_map(|path| Self::parse(path.as_ref())).collect()
    }

    pub fn segments(&self) -> &[RelationSegment] {
        &self.segments
    }

    /// Relation names of the first `depth` segments
    pub fn prefix(&self, depth: usize) -> Vec<String> {
        self.segments
            .iter()
            .take(depth)
            .map(|segment| segment.name.clone())
            .collect()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}
