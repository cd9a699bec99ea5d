//! Bulk-input file parsing.
//!
//! Three input formats feed the bulk operations: a CSV of account rows
//! for `account import`, a CSV of page rows for `page bulk-add`, and a
//! JSONL file of partial updates for `bulk-edit`. Each JSONL line is one
//! JSON object holding the record id plus the columns to change; any
//! column name outside the known set is rejected before touching the
//! database.

use std::path::Path;

use serde_json::Value;

use crate::error::{PagedeskError, Result};
use crate::model::{
    AccountField, AccountUpdate, BulkPageRow, FieldValue, ImportRecord, PageField, PageUpdate,
};

/// Read an account-import CSV. Column headers map onto [`ImportRecord`]
/// field names; missing columns default to empty strings.
pub fn read_import_records(path: &Path) -> Result<Vec<ImportRecord>> {
    let file = std::fs::File::open(path)?;
    import_records_from_reader(file)
}

fn import_records_from_reader<R: std::io::Read>(input: R) -> Result<Vec<ImportRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Read a bulk page-add CSV. Rows are matched to accounts later, by
/// profile id; unknown profile ids are skipped at that stage.
pub fn read_bulk_page_rows(path: &Path) -> Result<Vec<BulkPageRow>> {
    let file = std::fs::File::open(path)?;
    bulk_page_rows_from_reader(file)
}

fn bulk_page_rows_from_reader<R: std::io::Read>(input: R) -> Result<Vec<BulkPageRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Parse a JSONL file of partial account updates. Each line needs a
/// numeric `account_id`; every other key must be an account column.
pub fn read_account_updates(path: &Path) -> Result<Vec<AccountUpdate>> {
    account_updates_from_str(&std::fs::read_to_string(path)?)
}

fn account_updates_from_str(text: &str) -> Result<Vec<AccountUpdate>> {
    let mut updates = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let mut object: serde_json::Map<String, Value> = serde_json::from_str(line)?;
        let account_id = object
            .remove("account_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                PagedeskError::validation(format!("line {line_no}: missing numeric 'account_id'"))
            })?;
        let mut fields = Vec::with_capacity(object.len());
        for (key, value) in object {
            let field = AccountField::from_column(&key).ok_or_else(|| {
                PagedeskError::validation(format!("line {line_no}: unknown account column '{key}'"))
            })?;
            fields.push((field, field_value(&key, value, line_no)?));
        }
        updates.push(AccountUpdate { account_id, fields });
    }
    Ok(updates)
}

/// Parse a JSONL file of partial page updates, keyed by `page_id`.
pub fn read_page_updates(path: &Path) -> Result<Vec<PageUpdate>> {
    page_updates_from_str(&std::fs::read_to_string(path)?)
}

fn page_updates_from_str(text: &str) -> Result<Vec<PageUpdate>> {
    let mut updates = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let mut object: serde_json::Map<String, Value> = serde_json::from_str(line)?;
        let page_id = object
            .remove("page_id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| {
                PagedeskError::validation(format!("line {line_no}: missing numeric 'page_id'"))
            })?;
        let mut fields = Vec::with_capacity(object.len());
        for (key, value) in object {
            let field = PageField::from_column(&key).ok_or_else(|| {
                PagedeskError::validation(format!("line {line_no}: unknown page column '{key}'"))
            })?;
            fields.push((field, field_value(&key, value, line_no)?));
        }
        updates.push(PageUpdate { page_id, fields });
    }
    Ok(updates)
}

fn field_value(column: &str, value: Value, line_no: usize) -> Result<FieldValue> {
    match value {
        Value::String(text) => Ok(FieldValue::Text(text)),
        Value::Number(number) => number.as_i64().map(FieldValue::Int).ok_or_else(|| {
            PagedeskError::validation(format!(
                "line {line_no}: '{column}' must be an integer, not a float"
            ))
        }),
        Value::Null => Ok(FieldValue::Text(String::new())),
        Value::Array(items) => {
            let mut entries = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => entries.push(text),
                    other => {
                        return Err(PagedeskError::validation(format!(
                            "line {line_no}: '{column}' list entries must be strings, got {other}"
                        )));
                    }
                }
            }
            Ok(FieldValue::List(entries))
        }
        other => Err(PagedeskError::validation(format!(
            "line {line_no}: unsupported value for '{column}': {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_csv_fills_missing_columns_with_defaults() {
        let csv = "profile_id,account_name\nFB-01,alice\nFB-02,bob\n";
        let records = import_records_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].profile_id, "FB-01");
        assert_eq!(records[0].account_category, "");
    }

    #[test]
    fn bulk_page_csv_trims_whitespace() {
        let csv = "profile_id,page_name\n FB-01 ,  my page \n";
        let rows = bulk_page_rows_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].profile_id, "FB-01");
        assert_eq!(rows[0].page_name, "my page");
    }

    #[test]
    fn account_updates_parse_text_and_int_values() {
        let text = r#"{"account_id": 3, "account_category": "gaming"}
{"account_id": 4, "proxy": "10.0.0.1"}"#;
        let updates = account_updates_from_str(text).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].account_id, 3);
        assert_eq!(updates[0].fields.len(), 1);
    }

    #[test]
    fn unknown_column_is_rejected_with_line_number() {
        let text = r#"{"account_id": 1, "password": "nope"}"#;
        let err = account_updates_from_str(text).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn missing_page_id_is_rejected() {
        let text = r#"{"page_name": "Orphan"}"#;
        let err = page_updates_from_str(text).unwrap_err();
        assert!(err.to_string().contains("page_id"));
    }

    #[test]
    fn page_updates_accept_date_strings_and_folder_lists() {
        let text = r#"{"page_id": 9, "video_schedule_date": "2025-03-01", "used_folders": ["a", "b"]}"#;
        let updates = page_updates_from_str(text).unwrap();
        assert_eq!(updates[0].fields.len(), 2);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "\n\n{\"account_id\": 1, \"note\": \"hi\"}\n\n";
        let updates = account_updates_from_str(text).unwrap();
        assert_eq!(updates.len(), 1);
    }
}
