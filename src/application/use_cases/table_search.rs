// ============================================================
// TABLE SEARCH USE CASE
// ============================================================
// Column search over a CSV file, pagination, and application of
// validated table actions to the result set

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Instant, SystemTime};

use serde::{Deserialize, Serialize};

use crate::domain::csv::{CsvTable, FieldMap, OutputRow};
use crate::domain::error::{AppError, Result};
use crate::domain::table_action::{
    Condition, GroupAggregate, SearchResult, SortOrder, TableAction,
};
use crate::infrastructure::csv::{CsvParser, CsvWriter};

/// Case-insensitive substring search on one column.
///
/// A blank query is rejected. The column name itself is matched
/// case-insensitively; an unknown column yields no results.
pub fn search_rows(
    table: &CsvTable,
    search_text: &str,
    search_column: &str,
) -> Result<Vec<SearchResult>> {
    if search_text.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Search query cannot be empty.".to_string(),
        ));
    }

    let wanted = search_column.to_lowercase();
    let Some(column) = table.headers.iter().find(|h| h.to_lowercase() == wanted) else {
        tracing::debug!(search_column, "Search column not present in table");
        return Ok(Vec::new());
    };

    let needle = search_text.to_lowercase();
    Ok(table
        .rows
        .iter()
        .filter(|row| row.get(column).to_lowercase().contains(&needle))
        .map(|row| SearchResult {
            row_index: row.index,
            data: row.to_field_map(),
            matching_columns: vec![column.clone()],
        })
        .collect())
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    pub page: usize,
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<SearchResult>,
}

/// 1-based pagination; out-of-range pages are clamped
pub fn paginate(results: &[SearchResult], page: usize, rows_per_page: usize) -> ResultPage {
    let rows_per_page = rows_per_page.max(1);
    let total_pages = results.len().div_ceil(rows_per_page).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * rows_per_page;

    ResultPage {
        page,
        total_pages,
        total_rows: results.len(),
        rows: results.iter().skip(start).take(rows_per_page).cloned().collect(),
    }
}

/// Apply `action` to `results`.
///
/// Actions naming a column that the first result does not carry leave the
/// results unchanged.
pub fn apply_action(mut results: Vec<SearchResult>, action: &TableAction) -> Vec<SearchResult> {
    let Some(first) = results.first() else {
        return results;
    };
    let has_column = |column: &str| first.data.contains_key(column);

    match action {
        TableAction::Sort { column, order } => {
            if has_column(column) {
                results.sort_by(|a, b| {
                    let left = sort_key(a, column);
                    let right = sort_key(b, column);
                    match order {
                        SortOrder::Ascending => left.cmp(&right),
                        SortOrder::Descending => right.cmp(&left),
                    }
                });
            }
            results
        }
        TableAction::Filter { columns } => {
            if columns.is_empty() {
                return results;
            }
            for result in &mut results {
                result.data.retain(|key, _| columns.contains(key));
                result.matching_columns.retain(|c| columns.contains(c));
            }
            results
        }
        TableAction::Deduplicate { column } => {
            if !has_column(column) {
                return results;
            }
            let mut seen = std::collections::HashSet::new();
            results
                .into_iter()
                .filter(|r| seen.insert(r.data.get(column).cloned().unwrap_or_default()))
                .collect()
        }
        TableAction::Group { column, aggregate } => {
            if !has_column(column) {
                return results;
            }
            match aggregate {
                GroupAggregate::Count => group_count(results, column),
            }
        }
        TableAction::Count { condition } => vec![count_rows(&results, condition)],
        TableAction::Combine {
            column,
            condition,
            new_column,
        } => {
            let Condition::Contains { value, .. } = condition else {
                return results;
            };
            if !has_column(column) {
                return results;
            }
            for result in &mut results {
                let current = result.data.get(column).cloned().unwrap_or_default();
                if current.to_lowercase().contains(value.as_str()) {
                    result.data.insert(new_column.clone(), current);
                }
            }
            results
        }
        TableAction::Merge {
            columns,
            new_column,
        } => {
            let valid: Vec<&String> = columns.iter().filter(|c| has_column(c)).collect();
            if valid.is_empty() {
                return results;
            }
            for result in &mut results {
                let merged = valid
                    .iter()
                    .filter_map(|c| result.data.get(*c))
                    .filter(|v| !v.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ");
                result.data.insert(new_column.clone(), merged);
            }
            results
        }
    }
}

/// Render `results` as CSV text.
///
/// `columns` fixes the leading column order; columns present only in the
/// results follow in name order.
pub fn export_results(results: &[SearchResult], columns: &[String]) -> Result<String> {
    if results.is_empty() {
        return Err(AppError::ValidationError("No data to export".to_string()));
    }

    let mut headers: Vec<String> = columns
        .iter()
        .filter(|c| results.iter().any(|r| r.data.contains_key(*c)))
        .cloned()
        .collect();
    let mut extra: Vec<&String> = results
        .iter()
        .flat_map(|r| r.data.keys())
        .filter(|key| !headers.contains(*key))
        .collect();
    extra.sort();
    extra.dedup();
    headers.extend(extra.into_iter().cloned());

    let rows: Vec<OutputRow> = results
        .iter()
        .map(|r| r.data.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
        .collect();

    tracing::debug!(rows = rows.len(), columns = headers.len(), "Exporting search results");
    CsvWriter::new().write_to_string(&headers, &rows)
}

fn sort_key(result: &SearchResult, column: &str) -> String {
    result
        .data
        .get(column)
        .map(|v| v.to_lowercase())
        .unwrap_or_default()
}

fn group_count(results: Vec<SearchResult>, column: &str) -> Vec<SearchResult> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (usize, usize)> = HashMap::new();

    for result in &results {
        let key = result.data.get(column).cloned().unwrap_or_default();
        groups
            .entry(key.clone())
            .and_modify(|(_, count)| *count += 1)
            .or_insert_with(|| {
                order.push(key);
                (result.row_index, 1)
            });
    }

    order
        .into_iter()
        .map(|key| {
            let (row_index, count) = groups[&key];
            let mut data = FieldMap::new();
            data.insert(column.to_string(), key);
            data.insert("count".to_string(), count.to_string());
            SearchResult {
                row_index,
                data,
                matching_columns: Vec::new(),
            }
        })
        .collect()
}

fn count_rows(results: &[SearchResult], condition: &Condition) -> SearchResult {
    let has_column = |column: &str| {
        results
            .first()
            .is_some_and(|first| first.data.contains_key(column))
    };

    let (label, count) = match condition {
        Condition::Contains { column, value } if has_column(column) => (
            format!("Count of rows where {} contains {}", column, value),
            results
                .iter()
                .filter(|r| {
                    r.data
                        .get(column)
                        .is_some_and(|v| v.to_lowercase().contains(value.as_str()))
                })
                .count(),
        ),
        Condition::NotEmpty { column } if has_column(column) => (
            format!("Count of rows where {} is not empty", column),
            results
                .iter()
                .filter(|r| r.data.get(column).is_some_and(|v| !v.is_empty()))
                .count(),
        ),
        Condition::Contains { column, .. } | Condition::NotEmpty { column } => {
            (format!("Column '{}' not found", column), 0)
        }
        Condition::Invalid(_) => ("Invalid condition format".to_string(), 0),
    };

    let mut data = FieldMap::new();
    data.insert("Result".to_string(), label);
    data.insert("Count".to_string(), count.to_string());
    SearchResult {
        row_index: 0,
        data,
        matching_columns: Vec::new(),
    }
}

struct CachedTable {
    modified: SystemTime,
    loaded_at: Instant,
    table: Arc<CsvTable>,
}

/// Parsed tables keyed by path and modification time
pub struct SearchCache {
    capacity: usize,
    entries: Mutex<HashMap<PathBuf, CachedTable>>,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached table for `path`, re-parsed when the file changed on disk
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<CsvTable>> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| AppError::NotFound(format!("{}: {}", path.display(), e)))?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("search cache lock poisoned".to_string()))?;

        if let Some(entry) = entries.get(path) {
            if entry.modified == modified {
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(CsvParser::parse_file_auto_detect(path)?);
        tracing::debug!(path = %path.display(), rows = table.len(), "Loaded table into search cache");

        if entries.len() >= self.capacity && !entries.contains_key(path) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.loaded_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            path.to_path_buf(),
            CachedTable {
                modified,
                loaded_at: Instant::now(),
                table: Arc::clone(&table),
            },
        );

        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::csv::CsvRow;

    fn table() -> CsvTable {
        let headers: Vec<String> = ["Name", "Email1", "Email2", "City"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            CsvRow::from_pairs(0, [("Name", "jane"), ("Email1", "jane@gmail.com"), ("Email2", ""), ("City", "Oslo")]),
            CsvRow::from_pairs(1, [("Name", "Adam"), ("Email1", "adam@corp.com"), ("Email2", "adam@GMAIL.com"), ("City", "Rome")]),
            CsvRow::from_pairs(2, [("Name", "bob"), ("Email1", "bob@gmail.com"), ("Email2", "b@x.com"), ("City", "Oslo")]),
            CsvRow::from_pairs(3, [("Name", "Cat"), ("Email1", ""), ("Email2", ""), ("City", "Rome")]),
        ];
        CsvTable::new(headers, rows)
    }

    /// Every row: each city contains an "o"
    fn all_rows() -> Vec<SearchResult> {
        search_rows(&table(), "o", "City").unwrap()
    }

    fn names(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.data["Name"].as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let results = search_rows(&table(), "GMAIL", "email1").unwrap();
        assert_eq!(names(&results), vec!["jane", "bob"]);
        assert_eq!(results[1].row_index, 2);
        assert_eq!(results[0].matching_columns, vec!["Email1"]);
    }

    #[test]
    fn test_blank_query_is_rejected() {
        for query in ["", "   "] {
            assert!(matches!(
                search_rows(&table(), query, "Email1"),
                Err(AppError::ValidationError(_))
            ));
        }
        assert_eq!(all_rows().len(), 4);
    }

    #[test]
    fn test_search_unknown_column_is_empty() {
        assert!(search_rows(&table(), "x", "Phone").unwrap().is_empty());
    }

    #[test]
    fn test_paginate_clamps_pages() {
        let results = all_rows();
        let page = paginate(&results, 2, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.rows.len(), 1);

        let page = paginate(&results, 9, 3);
        assert_eq!(page.page, 2);

        let page = paginate(&[], 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_sort_case_insensitive_descending() {
        let results = all_rows();
        let sorted = apply_action(
            results,
            &TableAction::Sort {
                column: "Name".into(),
                order: SortOrder::Descending,
            },
        );
        assert_eq!(names(&sorted), vec!["jane", "Cat", "bob", "Adam"]);
    }

    #[test]
    fn test_filter_projects_columns() {
        let results = search_rows(&table(), "gmail", "Email1").unwrap();
        let filtered = apply_action(
            results,
            &TableAction::Filter {
                columns: vec!["Name".into()],
            },
        );
        assert_eq!(filtered[0].data.len(), 1);
        assert!(filtered[0].matching_columns.is_empty());
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let results = all_rows();
        let deduped = apply_action(
            results,
            &TableAction::Deduplicate {
                column: "City".into(),
            },
        );
        assert_eq!(names(&deduped), vec!["jane", "Adam"]);
    }

    #[test]
    fn test_group_counts_in_first_seen_order() {
        let results = all_rows();
        let grouped = apply_action(
            results,
            &TableAction::Group {
                column: "City".into(),
                aggregate: GroupAggregate::Count,
            },
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].data["City"], "Oslo");
        assert_eq!(grouped[0].data["count"], "2");
        assert_eq!(grouped[1].row_index, 1);
    }

    #[test]
    fn test_count_conditions() {
        let results = all_rows();

        let counted = apply_action(
            results.clone(),
            &TableAction::Count {
                condition: Condition::parse("Email2 is not empty"),
            },
        );
        assert_eq!(counted.len(), 1);
        assert_eq!(counted[0].data["Count"], "2");

        let counted = apply_action(
            results.clone(),
            &TableAction::Count {
                condition: Condition::parse("Email1 contains GMAIL"),
            },
        );
        assert_eq!(counted[0].data["Count"], "2");
        assert_eq!(
            counted[0].data["Result"],
            "Count of rows where Email1 contains gmail"
        );

        let counted = apply_action(
            results.clone(),
            &TableAction::Count {
                condition: Condition::parse("Phone is not empty"),
            },
        );
        assert_eq!(counted[0].data["Result"], "Column 'Phone' not found");

        let counted = apply_action(
            results,
            &TableAction::Count {
                condition: Condition::parse("whatever"),
            },
        );
        assert_eq!(counted[0].data["Result"], "Invalid condition format");
    }

    #[test]
    fn test_combine_copies_matching_values() {
        let results = all_rows();
        let combined = apply_action(
            results,
            &TableAction::Combine {
                column: "Email2".into(),
                condition: Condition::parse("contains gmail"),
                new_column: "EMAIL SHEETS".into(),
            },
        );
        let tagged: Vec<_> = combined
            .iter()
            .filter_map(|r| r.data.get("EMAIL SHEETS"))
            .collect();
        assert_eq!(tagged, vec!["adam@GMAIL.com"]);
    }

    #[test]
    fn test_merge_joins_non_empty_values() {
        let results = all_rows();
        let merged = apply_action(
            results,
            &TableAction::Merge {
                columns: vec!["Email1".into(), "Email2".into(), "Email9".into()],
                new_column: "email ko".into(),
            },
        );
        assert_eq!(merged[1].data["email ko"], "adam@corp.com, adam@GMAIL.com");
        assert_eq!(merged[0].data["email ko"], "jane@gmail.com");
        assert_eq!(merged[3].data["email ko"], "");
    }

    #[test]
    fn test_actions_on_empty_results() {
        let out = apply_action(
            Vec::new(),
            &TableAction::Count {
                condition: Condition::parse("Name is not empty"),
            },
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_export_orders_known_columns_first() {
        let results = search_rows(&table(), "gmail", "Email1").unwrap();
        let csv = export_results(&results, &["Name".to_string(), "Missing".to_string()]).unwrap();

        assert_eq!(
            csv,
            "Name,City,Email1,Email2\njane,Oslo,jane@gmail.com,\nbob,Oslo,bob@gmail.com,b@x.com\n"
        );
        assert!(matches!(
            export_results(&[], &[]),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cache_reuses_and_evicts() {
        let dir = std::env::temp_dir().join(format!("search_cache_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let first = dir.join("a.csv");
        let second = dir.join("b.csv");
        std::fs::write(&first, "Name,email\nAnn,a@x.com\n").unwrap();
        std::fs::write(&second, "Name,email\nBob,b@x.com\n").unwrap();

        let cache = SearchCache::new(1);
        let a1 = cache.get_or_load(&first).unwrap();
        let a2 = cache.get_or_load(&first).unwrap();
        assert!(Arc::ptr_eq(&a1, &a2));

        cache.get_or_load(&second).unwrap();
        assert_eq!(cache.len(), 1);

        let missing = cache.get_or_load(&dir.join("missing.csv"));
        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
