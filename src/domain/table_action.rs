// ============================================================
// TABLE ACTIONS
// ============================================================
// Closed set of structured manipulations applicable to search results.
// Anything produced outside the crate (model output, HTTP bodies) is parsed
// into this enum before it can touch a result set.

use serde::{Deserialize, Serialize};

use super::csv::FieldMap;
use super::error::{AppError, Result};

/// One matched row of a column search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Global 0-based data row index in the source file
    pub row_index: usize,

    pub data: FieldMap,

    /// Columns whose value matched the search text
    #[serde(default)]
    pub matching_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "Ascending", alias = "asc")]
    Ascending,
    #[serde(alias = "Descending", alias = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupAggregate {
    #[default]
    Count,
}

/// Row predicate written as `"<column> contains <value>"` or
/// `"<column> is not empty"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    /// `value` is stored lowercased; matching is case-insensitive
    Contains { column: String, value: String },
    NotEmpty { column: String },
    Invalid(String),
}

impl Condition {
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        if let Some(idx) = parts.iter().position(|p| *p == "contains") {
            return Condition::Contains {
                column: parts[..idx].join(" "),
                value: parts[idx + 1..].join(" ").to_lowercase(),
            };
        }
        if raw.contains(" is not empty") {
            return Condition::NotEmpty {
                column: raw.replace(" is not empty", "").trim().to_string(),
            };
        }
        Condition::Invalid(raw.to_string())
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Condition::parse(&raw)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Contains { column, value } => format!("{} contains {}", column, value),
            Condition::NotEmpty { column } => format!("{} is not empty", column),
            Condition::Invalid(raw) => raw,
        }
    }
}

/// Structured manipulation of a search result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TableAction {
    Sort {
        column: String,
        #[serde(default)]
        order: SortOrder,
    },
    Filter {
        #[serde(default)]
        columns: Vec<String>,
    },
    Deduplicate {
        column: String,
    },
    Group {
        column: String,
        #[serde(default)]
        aggregate: GroupAggregate,
    },
    Count {
        condition: Condition,
    },
    Combine {
        column: String,
        condition: Condition,
        new_column: String,
    },
    Merge {
        columns: Vec<String>,
        new_column: String,
    },
}

impl TableAction {
    /// Parse and validate a JSON action object
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json.trim()).map_err(|e| {
            AppError::ValidationError(format!("Unsupported table action: {}", e))
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            TableAction::Sort { .. } => "sort",
            TableAction::Filter { .. } => "filter",
            TableAction::Deduplicate { .. } => "deduplicate",
            TableAction::Group { .. } => "group",
            TableAction::Count { .. } => "count",
            TableAction::Combine { .. } => "combine",
            TableAction::Merge { .. } => "merge",
        }
    }
}
