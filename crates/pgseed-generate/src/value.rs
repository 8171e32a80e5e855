use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use pgseed_core::ColumnType;

/// A generated cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(String),
    /// Value copied from a parent row, in its textual form.
    Existing(String),
}

impl SampleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SampleValue::Null)
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Null => f.write_str("NULL"),
            SampleValue::Integer(value) => write!(f, "{value}"),
            SampleValue::Float(value) => write!(f, "{value}"),
            SampleValue::Boolean(value) => write!(f, "{value}"),
            SampleValue::Text(value) | SampleValue::Json(value) | SampleValue::Existing(value) => {
                f.write_str(value)
            }
            SampleValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            SampleValue::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%dT%H:%M:%S")),
            SampleValue::TimestampTz(value) => {
                f.write_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

/// One column of a generated row.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleEntry {
    pub column: String,
    pub value: SampleValue,
    /// Type used to decide how the value is written as a literal.
    pub column_type: ColumnType,
    /// True when the value was resolved from a parent table.
    pub dependent: bool,
}

/// Column-name to value mapping for one row, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRow {
    entries: Vec<SampleEntry>,
    empty_parents: usize,
}

impl SampleRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SampleEntry) {
        self.entries.push(entry);
    }

    pub fn get(&self, column: &str) -> Option<&SampleEntry> {
        self.entries.iter().find(|entry| entry.column == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dependent columns holding NULL, whatever the reason.
    pub fn null_dependents(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.dependent && entry.value.is_null())
            .count()
    }

    /// Record a dependent column set to NULL because its parent table had no rows.
    pub fn note_empty_parent(&mut self) {
        self.empty_parents += 1;
    }

    /// Dependent columns set to NULL because their parent table had no rows.
    pub fn empty_parents(&self) -> usize {
        self.empty_parents
    }
}
