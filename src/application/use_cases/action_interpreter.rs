use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::table_action::{SearchResult, TableAction};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::{clean_llm_response, split_action_block};

/// Rows shown to the model as a sample of the result set
pub const SAMPLE_ROWS: usize = 5;

pub const NO_RESULTS_MESSAGE: &str = "No search results to analyze.";

/// What the model is told about the current result set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSummary {
    pub search_column: String,
    pub last_query: String,
    pub columns: Vec<String>,
    pub num_rows: usize,
    #[serde(default)]
    pub sample_rows: Vec<SearchResult>,
}

impl ResultSummary {
    pub fn from_results(
        search_column: impl Into<String>,
        last_query: impl Into<String>,
        columns: Vec<String>,
        results: &[SearchResult],
    ) -> Self {
        Self {
            search_column: search_column.into(),
            last_query: last_query.into(),
            columns,
            num_rows: results.len(),
            sample_rows: results.iter().take(SAMPLE_ROWS).cloned().collect(),
        }
    }

    fn sample_text(&self) -> String {
        let mut text = String::new();
        for (i, row) in self.sample_rows.iter().enumerate() {
            let fields = self
                .columns
                .iter()
                .filter_map(|c| row.data.get(c).map(|v| format!("{}={}", c, v)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(text, "Row {} (Index {}): {}", i + 1, row.row_index, fields);
        }
        text
    }
}

/// Model reply, split into answer text and an optional validated action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Interpretation {
    Informational { message: String },
    Action { message: String, action: TableAction },
}

impl Interpretation {
    pub fn message(&self) -> &str {
        match self {
            Interpretation::Informational { message } | Interpretation::Action { message, .. } => {
                message
            }
        }
    }

    pub fn action(&self) -> Option<&TableAction> {
        match self {
            Interpretation::Action { action, .. } => Some(action),
            Interpretation::Informational { .. } => None,
        }
    }
}

pub struct ActionInterpreter {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
}

impl ActionInterpreter {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>) -> Self {
        Self { llm_client }
    }

    /// Ask the model about `summary`; any action it proposes must parse as a
    /// `TableAction` before it is returned
    pub async fn interpret(
        &self,
        config: &LLMConfig,
        summary: &ResultSummary,
        query: &str,
    ) -> Result<Interpretation> {
        if summary.num_rows == 0 {
            return Ok(Interpretation::Informational {
                message: NO_RESULTS_MESSAGE.to_string(),
            });
        }

        let system_prompt = build_system_prompt(summary);
        let user_prompt = format!(
            "Search results:\n- Columns: {}\n- Rows: {}\nSample:\n{}\nUser query: {}",
            summary.columns.join(", "),
            summary.num_rows,
            summary.sample_text(),
            query
        );

        tracing::info!(
            provider = ?config.provider,
            model = %config.model,
            rows = summary.num_rows,
            "Interpreting query"
        );

        let raw = self
            .llm_client
            .generate(config, &system_prompt, &user_prompt)
            .await?;
        let (message, payload) = split_action_block(&clean_llm_response(&raw));

        match payload {
            Some(payload) => {
                let action = TableAction::parse(&payload).inspect_err(|e| {
                    tracing::warn!(error = %e, "Model proposed an unsupported action");
                })?;
                tracing::debug!(action = action.name(), "Model proposed an action");
                Ok(Interpretation::Action { message, action })
            }
            None => Ok(Interpretation::Informational { message }),
        }
    }
}

fn build_system_prompt(summary: &ResultSummary) -> String {
    let query = &summary.last_query;
    format!(
        "You are an AI assistant specialized in CSV data analysis. \
Based on the search results (searched via '{column}' column with query '{query}'), you can:\n\
- Provide information about the search results without modifying the table.\n\
- Manipulate the table (sort, filter, deduplicate, group, count, combine, merge).\n\
Instructions:\n\
- For queries requiring only information, answer in HTML without a <script> tag.\n\
- For queries requiring table manipulation, include one JSON object in a <script type='ai-action'> tag.\n\
Supported actions:\n\
{{\"action\": \"sort\", \"column\": \"Name\", \"order\": \"ascending\"}}\n\
{{\"action\": \"filter\", \"columns\": [\"Name\", \"email\"]}}\n\
{{\"action\": \"deduplicate\", \"column\": \"email\"}}\n\
{{\"action\": \"group\", \"column\": \"City\", \"aggregate\": \"count\"}}\n\
{{\"action\": \"count\", \"condition\": \"email is not empty\"}}\n\
{{\"action\": \"combine\", \"column\": \"email\", \"condition\": \"contains {query}\", \"new_column\": \"EMAIL SHEETS\"}}\n\
{{\"action\": \"merge\", \"columns\": [\"Email1\", \"Email2\"], \"new_column\": \"email ko\"}}\n\
Conditions use 'column contains value' or 'column is not empty'.\n\
Column names must match those in the table: {columns}.\n\
Respond in HTML with <div class='ai-header'> and <div class='ai-content'> tags.",
        column = summary.search_column,
        query = query,
        columns = summary.columns.join(", "),
    )
}
