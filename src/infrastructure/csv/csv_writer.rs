// ============================================================
// CSV WRITER
// ============================================================
// Write output rows under a single fixed header line

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::domain::csv::OutputRow;
use crate::domain::error::AppError;

/// Comma-separated writer; fields are quoted only when needed
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `headers` then every row projected onto them
    pub fn write<W: Write>(
        &self,
        sink: W,
        headers: &[String],
        rows: &[OutputRow],
    ) -> Result<(), AppError> {
        let mut writer = WriterBuilder::new().from_writer(sink);

        writer
            .write_record(headers)
            .map_err(|e| AppError::IoError(format!("Failed to write CSV header: {}", e)))?;

        for (idx, row) in rows.iter().enumerate() {
            writer.write_record(row.values_for(headers)).map_err(|e| {
                AppError::IoError(format!("Failed to write CSV row {}: {}", idx + 1, e))
            })?;
        }

        writer
            .flush()
            .map_err(|e| AppError::IoError(format!("Failed to flush CSV output: {}", e)))?;
        Ok(())
    }

    pub fn write_file(
        &self,
        path: &Path,
        headers: &[String],
        rows: &[OutputRow],
    ) -> Result<(), AppError> {
        let file = File::create(path).map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
        })?;
        self.write(file, headers, rows)
    }

    /// Render to an in-memory string
    pub fn write_to_string(
        &self,
        headers: &[String],
        rows: &[OutputRow],
    ) -> Result<String, AppError> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, headers, rows)?;
        String::from_utf8(buffer)
            .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))
    }
}
