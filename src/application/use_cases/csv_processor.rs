// ============================================================
// CSV PROCESSOR USE CASE
// ============================================================
// Orchestrate parsing, consolidation, expansion and output writing

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::consolidator::{consolidate, resolve_key_fields, select_key_fields};
use crate::application::use_cases::row_expander::{expand_declared, output_headers};
use crate::domain::consolidation::ConsolidationOptions;
use crate::domain::csv::{CsvTable, OutputRow};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{CsvParser, CsvWriter};
use crate::infrastructure::storage::processed_output_path;

/// Outcome of consolidating one file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub output_path: PathBuf,
    pub input_rows: usize,
    pub groups: usize,
    pub output_rows: usize,
    pub key_fields: Vec<String>,
    pub headers: Vec<String>,
    pub processing_time_ms: u64,
}

/// In-memory result of a consolidation run
#[derive(Debug, Clone)]
pub struct ProcessedTable {
    /// Fixed output header line
    pub headers: Vec<String>,
    pub rows: Vec<OutputRow>,
    pub input_rows: usize,
    pub groups: usize,
    pub key_fields: Vec<String>,
}

impl ProcessedTable {
    /// Rows projected onto the header line
    pub fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.values_for(&self.headers)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}

/// Headers of a file plus the key columns a run would group by
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderPreview {
    pub headers: Vec<String>,
    pub key_fields: Vec<String>,
}

/// CSV consolidation use case
#[derive(Debug, Clone, Default)]
pub struct CsvProcessor {
    output_dir: Option<PathBuf>,
}

impl CsvProcessor {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }

    /// Consolidate `input` and write the processed file
    pub fn process_file(
        &self,
        input: &Path,
        options: &ConsolidationOptions,
    ) -> Result<ProcessingReport> {
        let start = Instant::now();
        tracing::info!(input = %input.display(), "Starting processing");

        let table = CsvParser::parse_file_auto_detect(input)?;
        let processed = self.process_table(&table, options)?;

        let output_path = processed_output_path(input, self.output_dir.as_deref(), Local::now())?;
        CsvWriter::new().write_file(&output_path, &processed.headers, &processed.rows)?;

        if processed.rows.is_empty() {
            tracing::warn!(
                input = %input.display(),
                "No rows matched the selected content mode; output holds headers only"
            );
        }

        tracing::info!(
            output = %output_path.display(),
            groups = processed.groups,
            rows = processed.rows.len(),
            "Processing complete"
        );

        Ok(ProcessingReport {
            output_path,
            input_rows: processed.input_rows,
            groups: processed.groups,
            output_rows: processed.rows.len(),
            key_fields: processed.key_fields,
            headers: processed.headers,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run the pipeline on in-memory CSV text
    pub fn process_content(
        &self,
        content: &str,
        options: &ConsolidationOptions,
    ) -> Result<ProcessedTable> {
        let delimiter = CsvParser::detect_delimiter(content);
        let table = CsvParser::new()
            .with_delimiter(delimiter)
            .parse_content(content)?;
        self.process_table(&table, options)
    }

    /// Consolidate and expand an already parsed table
    pub fn process_table(
        &self,
        table: &CsvTable,
        options: &ConsolidationOptions,
    ) -> Result<ProcessedTable> {
        options.validate().map_err(|e| {
            AppError::ConfigurationError(format!("Invalid consolidation options: {}", e))
        })?;

        if table.headers.is_empty() {
            tracing::error!("No headers found in CSV");
            return Err(AppError::ConfigurationError(
                "No headers found in CSV".to_string(),
            ));
        }

        let key_fields = resolve_key_fields(&table.headers, options.key_fields.as_deref())?;
        let groups = consolidate(&table.rows, &table.headers, &key_fields);

        let headers = output_headers(&options.output_columns, options.content_mode);
        let rows = expand_declared(
            &groups,
            &options.output_columns,
            &headers,
            options.content_mode,
            options.layout_mode,
        );

        Ok(ProcessedTable {
            headers,
            rows,
            input_rows: table.len(),
            groups: groups.len(),
            key_fields,
        })
    }

    /// Header line and default key columns, for column selection
    pub fn read_headers(&self, input: &Path) -> Result<HeaderPreview> {
        let headers = CsvParser::read_headers(input)?;
        if headers.is_empty() {
            return Err(AppError::ConfigurationError(
                "No headers found in CSV".to_string(),
            ));
        }
        let key_fields = select_key_fields(&headers);
        Ok(HeaderPreview {
            headers,
            key_fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consolidation::{ContentMode, LayoutMode};

    const CONTACTS_CSV: &str = "\
ACTIVATION,Name,Company,Email1,Email2,Phone1,Phone2
A1,Ann,,ann@x.com,,111,
A1,,Acme,ann@work.com,ann@x.com,,222
B2,Bob,Beta,not-an-email,,,
C3,Cy,,,,333,";

    fn options(mode: ContentMode, layout: LayoutMode) -> ConsolidationOptions {
        ConsolidationOptions::new(vec!["ACTIVATION".into(), "Name".into(), "Company".into()])
            .with_content_mode(mode)
            .with_layout_mode(layout)
            .with_key_fields(vec!["ACTIVATION".into()])
    }

    #[test]
    fn test_aggregate_email_and_phone() {
        let processor = CsvProcessor::default();
        let result = processor
            .process_content(
                CONTACTS_CSV,
                &options(ContentMode::EmailAndPhone, LayoutMode::Aggregate),
            )
            .unwrap();

        assert_eq!(result.input_rows, 4);
        assert_eq!(result.groups, 3);
        assert_eq!(
            result.headers,
            vec!["ACTIVATION", "Name", "Company", "Email", "Phone"]
        );
        assert_eq!(
            result.records()[0],
            vec!["A1", "Ann", "Acme", "ann@x.com, ann@work.com", "111, 222"]
        );
        assert_eq!(result.records()[1], vec!["B2", "Bob", "Beta", "", ""]);
    }

    #[test]
    fn test_email_rows_drop_groups_without_valid_email() {
        let processor = CsvProcessor::default();
        let result = processor
            .process_content(CONTACTS_CSV, &options(ContentMode::Email, LayoutMode::PerValue))
            .unwrap();

        let emails: Vec<_> = result.rows.iter().filter_map(|r| r.get("Email")).collect();
        assert_eq!(emails, vec!["ann@x.com", "ann@work.com"]);
        assert_eq!(result.headers, vec!["ACTIVATION", "Name", "Company", "Email"]);
    }

    #[test]
    fn test_default_key_fields_use_preferred_columns() {
        let processor = CsvProcessor::default();
        let options = ConsolidationOptions::new(vec!["Name".into()]);
        let result = processor.process_content(CONTACTS_CSV, &options).unwrap();

        assert_eq!(result.key_fields, vec!["ACTIVATION", "Phone1", "Phone2", "Email1"]);
        // Every row differs on the phone/email key columns
        assert_eq!(result.groups, 4);
    }

    #[test]
    fn test_empty_selection_is_configuration_error() {
        let processor = CsvProcessor::default();
        let err = processor
            .process_content(CONTACTS_CSV, &ConsolidationOptions::default())
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn test_empty_file_reports_missing_headers() {
        let processor = CsvProcessor::default();
        let err = processor
            .process_content("", &options(ContentMode::None, LayoutMode::Aggregate))
            .unwrap_err();
        assert!(err.to_string().contains("No headers found"));
    }

    #[test]
    fn test_process_file_writes_timestamped_output() {
        let dir = std::env::temp_dir().join(format!("csv_processor_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("contacts.csv");
        std::fs::write(&input, CONTACTS_CSV).unwrap();

        let processor = CsvProcessor::new(None);
        let report = processor
            .process_file(&input, &options(ContentMode::Phone, LayoutMode::Aggregate))
            .unwrap();

        let written = std::fs::read_to_string(&report.output_path).unwrap();
        let file_name = report
            .output_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        std::fs::remove_dir_all(&dir).ok();

        assert!(file_name.starts_with("contacts_processed_"));
        assert!(file_name.ends_with(".csv"));
        assert_eq!(report.output_rows, 2);
        assert_eq!(
            written,
            "ACTIVATION,Name,Company,Phone\nA1,Ann,Acme,\"111, 222\"\nC3,Cy,,333\n"
        );
    }

    #[test]
    fn test_read_headers_suggests_keys() {
        let dir = std::env::temp_dir().join(format!("csv_headers_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("plain.csv");
        std::fs::write(&input, "a,b,c,d,e\n1,2,3,4,5\n").unwrap();

        let preview = CsvProcessor::default().read_headers(&input).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(preview.headers.len(), 5);
        assert_eq!(preview.key_fields, vec!["a", "b", "c", "d"]);
    }
}
