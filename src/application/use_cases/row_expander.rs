// ============================================================
// OUTPUT ROW EXPANDER
// ============================================================
// Turn consolidated groups into output rows according to the
// content and layout policies

use crate::domain::consolidation::{
    ConsolidatedGroups, ContentMode, GroupRecord, LayoutMode, EMAIL_COLUMN, PHONE_COLUMN,
};
use crate::domain::csv::OutputRow;

/// Fixed header line for a run: selected columns, then `Email` and `Phone`
/// as the content mode requires.
pub fn output_headers(output_columns: &[String], content_mode: ContentMode) -> Vec<String> {
    let mut headers = output_columns.to_vec();
    if content_mode.includes_email() && !headers.iter().any(|h| h == EMAIL_COLUMN) {
        headers.push(EMAIL_COLUMN.to_string());
    }
    if content_mode.includes_phone() && !headers.iter().any(|h| h == PHONE_COLUMN) {
        headers.push(PHONE_COLUMN.to_string());
    }
    headers
}

/// Expand `groups` using the header line derived from `output_columns`
pub fn expand(
    groups: &ConsolidatedGroups,
    output_columns: &[String],
    content_mode: ContentMode,
    layout_mode: LayoutMode,
) -> Vec<OutputRow> {
    let declared = output_headers(output_columns, content_mode);
    expand_declared(groups, output_columns, &declared, content_mode, layout_mode)
}

/// Expand `groups` against an explicit header line.
///
/// `Email`/`Phone` cells are only written when the column is part of
/// `declared_headers`, so no row ever carries a column outside it.
pub fn expand_declared(
    groups: &ConsolidatedGroups,
    output_columns: &[String],
    declared_headers: &[String],
    content_mode: ContentMode,
    layout_mode: LayoutMode,
) -> Vec<OutputRow> {
    let shape = RowShape {
        output_columns,
        email: declared_headers.iter().any(|h| h == EMAIL_COLUMN),
        phone: declared_headers.iter().any(|h| h == PHONE_COLUMN),
    };

    let mut rows = Vec::new();
    for record in groups {
        shape.expand_group(record, content_mode, layout_mode, &mut rows);
    }

    tracing::debug!(
        groups = groups.len(),
        rows = rows.len(),
        content_mode = %content_mode,
        layout_mode = %layout_mode,
        "Expanded consolidated groups"
    );

    rows
}

struct RowShape<'a> {
    output_columns: &'a [String],
    email: bool,
    phone: bool,
}

impl RowShape<'_> {
    /// Selected columns the group's base actually holds
    fn base_row(&self, record: &GroupRecord) -> OutputRow {
        self.output_columns
            .iter()
            .filter_map(|column| {
                record
                    .base
                    .get(column)
                    .map(|value| (column.clone(), value.clone()))
            })
            .collect()
    }

    fn expand_group(
        &self,
        record: &GroupRecord,
        content_mode: ContentMode,
        layout_mode: LayoutMode,
        out: &mut Vec<OutputRow>,
    ) {
        let base_row = self.base_row(record);
        let valid_emails = record.valid_emails();
        let phones: Vec<&str> = record.phones.iter().map(String::as_str).collect();

        if content_mode.suppresses_empty() {
            let relevant_is_empty = if content_mode.includes_email() {
                valid_emails.is_empty()
            } else {
                phones.is_empty()
            };
            if relevant_is_empty {
                return;
            }
        }

        match (content_mode, layout_mode) {
            (ContentMode::EmailAndPhone | ContentMode::None, LayoutMode::Aggregate) => {
                let mut row = base_row;
                self.set_email(&mut row, &valid_emails.join(", "));
                self.set_phone(&mut row, &phones.join(", "));
                out.push(row);
            }
            (ContentMode::EmailAndPhone | ContentMode::None, LayoutMode::PerValue) => {
                let count = valid_emails.len().max(phones.len());
                for i in 0..count {
                    let mut row = base_row.clone();
                    self.set_email(&mut row, valid_emails.get(i).copied().unwrap_or(""));
                    self.set_phone(&mut row, phones.get(i).copied().unwrap_or(""));
                    out.push(row);
                }
            }
            (ContentMode::Email, LayoutMode::Aggregate) => {
                let mut row = base_row;
                self.set_email(&mut row, &valid_emails.join(", "));
                out.push(row);
            }
            (ContentMode::Email, LayoutMode::PerValue) => {
                for email in &valid_emails {
                    let mut row = base_row.clone();
                    self.set_email(&mut row, email);
                    out.push(row);
                }
            }
            (ContentMode::Phone, LayoutMode::Aggregate) => {
                let mut row = base_row;
                self.set_phone(&mut row, &phones.join(", "));
                out.push(row);
            }
            (ContentMode::Phone, LayoutMode::PerValue) => {
                for phone in &phones {
                    let mut row = base_row.clone();
                    self.set_phone(&mut row, phone);
                    out.push(row);
                }
            }
        }
    }

    fn set_email(&self, row: &mut OutputRow, value: &str) {
        if self.email {
            row.insert(EMAIL_COLUMN, value);
        }
    }

    fn set_phone(&self, row: &mut OutputRow, value: &str) {
        if self.phone {
            row.insert(PHONE_COLUMN, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::consolidation::GroupKey;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn group(name: &str, emails: &[&str], phones: &[&str]) -> ConsolidatedGroups {
        let mut groups = ConsolidatedGroups::new();
        add_group(&mut groups, name, emails, phones);
        groups
    }

    fn add_group(groups: &mut ConsolidatedGroups, name: &str, emails: &[&str], phones: &[&str]) {
        let record = groups.entry_or_insert(GroupKey::new(vec![name.to_string()]));
        record.merge_base("Name", name);
        for email in emails {
            record.push_email(email);
        }
        for phone in phones {
            record.push_phone(phone);
        }
    }

    #[test]
    fn test_output_headers_per_mode() {
        let selected = columns(&["Name"]);
        assert_eq!(output_headers(&selected, ContentMode::None), vec!["Name"]);
        assert_eq!(output_headers(&selected, ContentMode::Email), vec!["Name", "Email"]);
        assert_eq!(output_headers(&selected, ContentMode::Phone), vec!["Name", "Phone"]);
        assert_eq!(
            output_headers(&selected, ContentMode::EmailAndPhone),
            vec!["Name", "Email", "Phone"]
        );
        assert_eq!(
            output_headers(&columns(&["Email", "Name"]), ContentMode::Email),
            vec!["Email", "Name"]
        );
    }

    #[test]
    fn test_aggregate_joins_values() {
        let groups = group("Ann", &["a@x.com", "b@x.com"], &["555"]);
        let rows = expand(
            &groups,
            &columns(&["Name"]),
            ContentMode::EmailAndPhone,
            LayoutMode::Aggregate,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Email"), Some("a@x.com, b@x.com"));
        assert_eq!(rows[0].get("Phone"), Some("555"));
        assert_eq!(rows[0].get("Name"), Some("Ann"));
    }

    #[test]
    fn test_aggregate_email_and_phone_never_suppresses() {
        let groups = group("Ann", &[], &[]);
        let rows = expand(
            &groups,
            &columns(&["Name"]),
            ContentMode::EmailAndPhone,
            LayoutMode::Aggregate,
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Email"), Some(""));
        assert_eq!(rows[0].get("Phone"), Some(""));
    }

    #[test]
    fn test_per_value_pads_shorter_list() {
        let groups = group("Ann", &["a@x.com"], &["111", "222"]);
        let rows = expand(
            &groups,
            &columns(&["Name"]),
            ContentMode::EmailAndPhone,
            LayoutMode::PerValue,
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Email"), Some("a@x.com"));
        assert_eq!(rows[0].get("Phone"), Some("111"));
        assert_eq!(rows[1].get("Email"), Some(""));
        assert_eq!(rows[1].get("Phone"), Some("222"));
    }

    #[test]
    fn test_per_value_skips_group_without_contacts() {
        let groups = group("Ann", &["not-an-email"], &[]);
        let rows = expand(
            &groups,
            &columns(&["Name"]),
            ContentMode::EmailAndPhone,
            LayoutMode::PerValue,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_email_mode_suppresses_groups_without_email() {
        let groups = group("Ann", &[], &["111", "222"]);
        for layout in [LayoutMode::Aggregate, LayoutMode::PerValue] {
            let rows = expand(&groups, &columns(&["Name"]), ContentMode::Email, layout);
            assert!(rows.is_empty(), "layout {:?}", layout);
        }
    }

    #[test]
    fn test_phone_mode_one_row_per_phone() {
        let groups = group("Ann", &["a@x.com"], &["111", "222"]);
        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Phone, LayoutMode::PerValue);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("Phone"), Some("222"));
        assert!(!rows[0].contains("Email"));
    }

    #[test]
    fn test_invalid_email_never_reaches_output() {
        let groups = group("Ann", &["not-an-email", "b@x.com"], &[]);
        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Email, LayoutMode::Aggregate);
        assert_eq!(rows[0].get("Email"), Some("b@x.com"));

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Email, LayoutMode::PerValue);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_none_mode_adds_no_contact_columns_by_default() {
        let groups = group("Ann", &["a@x.com"], &["111", "222"]);

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::None, LayoutMode::Aggregate);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["Name"]);

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::None, LayoutMode::PerValue);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| !r.contains("Phone")));
    }

    #[test]
    fn test_none_mode_fills_declared_contact_columns() {
        let groups = group("Ann", &["a@x.com"], &[]);
        let declared = columns(&["Name", "Email"]);
        let rows = expand_declared(
            &groups,
            &columns(&["Name"]),
            &declared,
            ContentMode::None,
            LayoutMode::Aggregate,
        );

        assert_eq!(rows[0].get("Email"), Some("a@x.com"));
        assert!(!rows[0].contains("Phone"));
    }

    #[test]
    fn test_unpopulated_selected_column_is_absent() {
        let groups = group("Ann", &["a@x.com"], &[]);
        let rows = expand(
            &groups,
            &columns(&["Name", "Company"]),
            ContentMode::Email,
            LayoutMode::Aggregate,
        );

        assert!(rows[0].contains("Name"));
        assert!(!rows[0].contains("Company"));
    }

    #[test]
    fn test_rows_stay_within_declared_headers() {
        let mut groups = ConsolidatedGroups::new();
        add_group(&mut groups, "Ann", &["a@x.com", "b@x.com"], &["1"]);
        add_group(&mut groups, "Bob", &[], &["2", "3", "4"]);
        add_group(&mut groups, "Cy", &[], &[]);

        let selected = columns(&["Name"]);
        for mode in [
            ContentMode::None,
            ContentMode::Email,
            ContentMode::Phone,
            ContentMode::EmailAndPhone,
        ] {
            let declared = output_headers(&selected, mode);
            for layout in [LayoutMode::Aggregate, LayoutMode::PerValue] {
                for row in expand(&groups, &selected, mode, layout) {
                    assert!(row.columns().all(|c| declared.iter().any(|d| d == c)));
                    let mut keys: Vec<_> = row.columns().map(str::to_string).collect();
                    keys.sort();
                    let mut expected = declared.clone();
                    expected.sort();
                    assert_eq!(keys, expected, "mode {:?} layout {:?}", mode, layout);
                }
            }
        }
    }

    #[test]
    fn test_groups_emitted_in_first_seen_order() {
        let mut groups = ConsolidatedGroups::new();
        add_group(&mut groups, "Bob", &[], &["2"]);
        add_group(&mut groups, "Ann", &[], &["1"]);

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Phone, LayoutMode::Aggregate);
        let names: Vec<_> = rows.iter().filter_map(|r| r.get("Name")).collect();
        assert_eq!(names, vec!["Bob", "Ann"]);
    }

    #[test]
    fn test_single_field_modes_skip_groups_without_that_field() {
        let mut groups = ConsolidatedGroups::new();
        add_group(&mut groups, "Ann", &["a@x.com"], &[]);
        add_group(&mut groups, "Bob", &[], &["555"]);

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Phone, LayoutMode::Aggregate);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("Bob"));

        let rows = expand(&groups, &columns(&["Name"]), ContentMode::Email, LayoutMode::Aggregate);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("Ann"));

        let rows = expand(
            &groups,
            &columns(&["Name"]),
            ContentMode::EmailAndPhone,
            LayoutMode::Aggregate,
        );
        assert_eq!(rows.len(), 2);
    }
}
