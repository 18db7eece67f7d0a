// ============================================================
// CSV PARSER
// ============================================================
// Parse CSV files with encoding detection and error handling

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::domain::csv::{CsvField, CsvRow, CsvTable};
use crate::domain::error::AppError;

/// Bytes sampled for delimiter detection
const SNIFF_SAMPLE_BYTES: usize = 4096;

/// CSV parser with encoding detection; values are always trimmed
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a CSV file into headers and rows
    pub fn parse_file(&self, path: &Path) -> Result<CsvTable, AppError> {
        let content = read_with_encoding_detection(path)?;
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<CsvTable, AppError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true) // Allow rows with different lengths
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(Self::parse_row(index, &headers, &record));
        }

        let headers = headers.iter().map(str::to_string).collect();

        Ok(CsvTable::new(headers, rows))
    }

    /// Parse a single CSV row; short records read as empty trailing fields
    fn parse_row(index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| CsvField::new(header, record.get(idx).unwrap_or("")))
            .collect();

        CsvRow::new(index, fields)
    }

    /// Read only the header line of a file
    pub fn read_headers(path: &Path) -> Result<Vec<String>, AppError> {
        let sample = read_sample(path)?;
        let delimiter = Self::detect_delimiter(&sample);

        let content = read_with_encoding_detection(path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?;

        Ok(headers.iter().map(str::to_string).collect())
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }

    /// Parse CSV file with automatic delimiter detection
    pub fn parse_file_auto_detect(path: &Path) -> Result<CsvTable, AppError> {
        let sample = read_sample(path)?;
        let delimiter = Self::detect_delimiter(&sample);

        tracing::debug!(
            path = %path.display(),
            delimiter = %(delimiter as char).escape_default(),
            "Detected CSV delimiter"
        );

        Self::default().with_delimiter(delimiter).parse_file(path)
    }
}

/// Decode file bytes: UTF-8 (BOM removed) first, Windows-1252 otherwise
fn read_with_encoding_detection(path: &Path) -> Result<String, AppError> {
    let mut file = open(path)?;

    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;

    Ok(decode(&buffer))
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => AppError::IoError(format!("Failed to open {}: {}", path.display(), e)),
    })
}

fn decode(bytes: &[u8]) -> String {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    tracing::warn!("Input is not valid UTF-8, decoding as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

fn read_sample(path: &Path) -> Result<String, AppError> {
    let file = open(path)?;

    let mut buffer = Vec::with_capacity(SNIFF_SAMPLE_BYTES);
    file.take(SNIFF_SAMPLE_BYTES as u64)
        .read_to_end(&mut buffer)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;

    Ok(String::from_utf8_lossy(&buffer).to_string())
}
