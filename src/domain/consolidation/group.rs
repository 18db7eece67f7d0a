// ============================================================
// GROUP TYPES
// ============================================================
// Per-key merged records produced by the consolidator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::csv::FieldMap;

/// Composite grouping identity: one value per configured key column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupKey(pub Vec<String>);

impl GroupKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

/// Merged view of every input row sharing one `GroupKey`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub key: GroupKey,

    /// First non-empty value seen per column
    pub base: FieldMap,

    /// Distinct email-column values, first-seen order
    pub emails: Vec<String>,

    /// Distinct phone-column values, first-seen order
    pub phones: Vec<String>,
}

impl GroupRecord {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            base: FieldMap::new(),
            emails: Vec::new(),
            phones: Vec::new(),
        }
    }

    /// Insert when the column is absent or currently empty.
    /// A populated value is never replaced.
    pub fn merge_base(&mut self, column: &str, value: &str) {
        match self.base.get_mut(column) {
            Some(existing) if !existing.is_empty() => {}
            Some(existing) => *existing = value.to_string(),
            None => {
                self.base.insert(column.to_string(), value.to_string());
            }
        }
    }

    pub fn push_email(&mut self, value: &str) {
        push_distinct(&mut self.emails, value);
    }

    pub fn push_phone(&mut self, value: &str) {
        push_distinct(&mut self.phones, value);
    }

    /// Emails containing `@`; a syntactic filter only
    pub fn valid_emails(&self) -> Vec<&str> {
        self.emails
            .iter()
            .filter(|email| email.contains('@'))
            .map(String::as_str)
            .collect()
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() || values.iter().any(|v| v == value) {
        return;
    }
    values.push(value.to_string());
}

/// Insertion-ordered map from `GroupKey` to `GroupRecord`
#[derive(Debug, Clone, Default)]
pub struct ConsolidatedGroups {
    records: Vec<GroupRecord>,
    index: HashMap<GroupKey, usize>,
}

impl ConsolidatedGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `key`, created empty on first sight
    pub fn entry_or_insert(&mut self, key: GroupKey) -> &mut GroupRecord {
        let position = match self.index.get(&key).copied() {
            Some(position) => position,
            None => {
                let position = self.records.len();
                self.index.insert(key.clone(), position);
                self.records.push(GroupRecord::new(key));
                position
            }
        };
        &mut self.records[position]
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupRecord> {
        self.index.get(key).map(|position| &self.records[*position])
    }

    /// Records in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &GroupRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConsolidatedGroups {
    type Item = &'a GroupRecord;
    type IntoIter = std::slice::Iter<'a, GroupRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
