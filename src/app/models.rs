//! Core data models for collision-report processing
//!
//! [`RawRow`] is one source line as read from the input file, and
//! [`CollisionRecord`] is the validated, strongly-typed record that is
//! streamed to the aggregation service.

use indexmap::IndexMap;
use std::fmt;

/// One source row as an ordered mapping from field name to raw text
///
/// Rows are transient: they are read once, normalized and dropped. Field
/// lookups never fail; a missing field reads as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: IndexMap<String, String>,
}

impl RawRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from field name/value pairs, keeping their order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Set a field value, replacing any previous value in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Trimmed value of a field, or empty text when the field is absent
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    /// Whether the row carries the named field at all
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields in the row
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for RawRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Failure reported by a row source while reading
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RowReadError {
    /// One line could not be decoded; reading can continue
    #[error("malformed row at line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// The source itself failed; no further rows will arrive
    #[error("row source failed: {message}")]
    Fatal { message: String },
}

/// A normalized collision record
///
/// `crash_date` is encoded as `YYYYMMDD` and `crash_time` as `HHMM`; neither
/// is range-checked beyond digit count. The eight counts are never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CollisionRecord {
    pub crash_date: i32,
    pub crash_time: i32,
    pub persons_injured: i32,
    pub persons_killed: i32,
    pub pedestrians_injured: i32,
    pub pedestrians_killed: i32,
    pub cyclists_injured: i32,
    pub cyclists_killed: i32,
    pub motorists_injured: i32,
    pub motorists_killed: i32,
}

impl CollisionRecord {
    /// Create a record with the given date and time and all counts at zero
    pub fn new(crash_date: i32, crash_time: i32) -> Self {
        Self {
            crash_date,
            crash_time,
            ..Self::default()
        }
    }
}
