use serde::{Deserialize, Serialize};

/// One output record: an insertion-ordered column → value mapping.
///
/// Columns are only present when a value was assigned, so a row may carry
/// fewer keys than the declared output header list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    entries: Vec<(String, String)>,
}

impl OutputRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing in place when the column exists
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project the row onto a fixed header line; absent columns become `""`
    pub fn values_for<'a>(&'a self, headers: &'a [String]) -> Vec<&'a str> {
        headers
            .iter()
            .map(|header| self.get(header).unwrap_or(""))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for OutputRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = OutputRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut row = OutputRow::new();
        row.insert("Name", "Alice");
        row.insert("Email", "a@x.com");
        row.insert("Name", "Bob");

        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["Name", "Email"]);
        assert_eq!(row.get("Name"), Some("Bob"));
    }

    #[test]
    fn test_projection_fills_blanks() {
        let row: OutputRow = [("Phone", "555")].into_iter().collect();
        let headers = vec!["Name".to_string(), "Phone".to_string()];
        assert_eq!(row.values_for(&headers), vec!["", "555"]);
    }
}
