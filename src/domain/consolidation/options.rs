// ============================================================
// CONSOLIDATION OPTIONS
// ============================================================
// Caller-supplied configuration for one consolidation run

use serde::{Deserialize, Serialize};

use super::{ContentMode, LayoutMode};

/// Configuration for a consolidation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsolidationOptions {
    /// Explicit grouping columns. When absent the preferred key set
    /// (or the first four headers) is used.
    #[serde(default)]
    pub key_fields: Option<Vec<String>>,

    /// Selected output columns, without Email/Phone
    pub output_columns: Vec<String>,

    #[serde(default)]
    pub content_mode: ContentMode,

    #[serde(default)]
    pub layout_mode: LayoutMode,
}

impl ConsolidationOptions {
    pub fn new(output_columns: Vec<String>) -> Self {
        Self {
            output_columns,
            ..Default::default()
        }
    }

    pub fn with_content_mode(mut self, content_mode: ContentMode) -> Self {
        self.content_mode = content_mode;
        self
    }

    pub fn with_layout_mode(mut self, layout_mode: LayoutMode) -> Self {
        self.layout_mode = layout_mode;
        self
    }

    pub fn with_key_fields(mut self, key_fields: Vec<String>) -> Self {
        self.key_fields = Some(key_fields);
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.output_columns.is_empty() {
            return Err("select at least one output column".to_string());
        }
        if self.output_columns.iter().any(|c| c.trim().is_empty()) {
            return Err("output column names must not be blank".to_string());
        }
        if let Some(keys) = &self.key_fields {
            if keys.is_empty() {
                return Err("key_fields must not be empty when provided".to_string());
            }
        }
        Ok(())
    }
}
