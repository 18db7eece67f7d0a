// ============================================================
// KEY-GROUPING CONSOLIDATOR
// ============================================================
// Fold input rows into one merged record per composite key

use crate::domain::consolidation::{
    ConsolidatedGroups, GroupKey, HeaderClassification, HeaderKind, FALLBACK_KEY_COUNT,
    PREFERRED_KEY_FIELDS,
};
use crate::domain::csv::CsvRow;
use crate::domain::error::{AppError, Result};

/// Preferred key columns present in `headers`, else the first four headers
pub fn select_key_fields(headers: &[String]) -> Vec<String> {
    let preferred: Vec<String> = PREFERRED_KEY_FIELDS
        .iter()
        .filter(|field| headers.iter().any(|h| h == *field))
        .map(|field| field.to_string())
        .collect();

    if !preferred.is_empty() {
        return preferred;
    }

    headers.iter().take(FALLBACK_KEY_COUNT).cloned().collect()
}

/// Validate caller-supplied key columns, or fall back to `select_key_fields`
pub fn resolve_key_fields(headers: &[String], requested: Option<&[String]>) -> Result<Vec<String>> {
    if headers.is_empty() {
        return Err(AppError::ConfigurationError(
            "No headers found in CSV".to_string(),
        ));
    }

    match requested {
        Some(fields) if !fields.is_empty() => {
            if let Some(unknown) = fields.iter().find(|f| !headers.contains(f)) {
                return Err(AppError::ConfigurationError(format!(
                    "Unknown key field: {}",
                    unknown
                )));
            }
            Ok(fields.to_vec())
        }
        _ => Ok(select_key_fields(headers)),
    }
}

/// Group `rows` by the values of `key_fields`.
///
/// Email/phone columns are detected from `headers` once per call. Empty
/// `headers` or `rows` produce an empty result.
pub fn consolidate<'a, I>(rows: I, headers: &[String], key_fields: &[String]) -> ConsolidatedGroups
where
    I: IntoIterator<Item = &'a CsvRow>,
{
    let mut groups = ConsolidatedGroups::new();
    if headers.is_empty() {
        return groups;
    }

    let classification = HeaderClassification::new(headers);
    let mut row_count = 0usize;

    for row in rows {
        row_count += 1;

        let key = GroupKey::new(
            key_fields
                .iter()
                .map(|field| row.get(field).trim().to_string())
                .collect(),
        );
        let record = groups.entry_or_insert(key);

        for (header, kind) in classification.iter() {
            match kind {
                HeaderKind::Email => record.push_email(row.get(header)),
                HeaderKind::Phone => record.push_phone(row.get(header)),
                HeaderKind::Other => {}
            }
        }

        for header in headers {
            record.merge_base(header, row.get(header).trim());
        }
    }

    tracing::debug!(
        rows = row_count,
        groups = groups.len(),
        "Processed {} rows, consolidated into {} records",
        row_count,
        groups.len()
    );

    groups
}
