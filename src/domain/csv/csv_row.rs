// ============================================================
// CSV ROW TYPES
// ============================================================
// Data structures representing parsed CSV content

use serde::{Deserialize, Serialize};

/// A single field in a CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvField {
    /// Original field name (header)
    pub name: String,

    /// Field value, trimmed by the parser
    pub value: String,
}

impl CsvField {
    /// Create a new CSV field
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single row in a CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// All fields in this row, in header order
    pub fields: Vec<CsvField>,
}

impl CsvRow {
    /// Create a new CSV row
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        Self { index, fields }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<K, V>(index: usize, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(name, value)| CsvField::new(name, value))
            .collect();
        Self::new(index, fields)
    }

    /// Value for `column`, or the empty string when the row has no such column.
    /// Duplicate headers resolve to the last occurrence.
    pub fn get(&self, column: &str) -> &str {
        self.fields
            .iter()
            .rev()
            .find(|f| f.name == column)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    /// Whether the row carries `column` at all
    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|f| f.name == column)
    }

    /// Field map for easy access
    pub fn to_field_map(&self) -> super::FieldMap {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }
}

/// Headers plus parsed rows of one CSV source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsvTable {
    /// Column names in file order
    pub headers: Vec<String>,

    /// Data rows in file order
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<CsvRow>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
