//! Arrow schemas for the CSV tables, and string extraction helpers.

use std::sync::Arc;

use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};

use crate::task::Task;

/// Text columns of the base training table, concatenated into one text.
pub const TRAINING_TEXT_COLUMNS: &[&str] = &["title", "summary", "inclusion_criteria"];

/// Column holding the free text in the feedback table.
pub const TEXT_COLUMN: &str = "text";

/// Column holding the keyword in the keyword mapping table.
pub const KEYWORD_COLUMN: &str = "keyword";

/// Schema for the feedback store: `text` plus one column per task.
pub fn feedback_schema() -> Schema {
    let mut fields = vec![Field::new(TEXT_COLUMN, DataType::Utf8, false)];
    fields.extend(task_fields());
    Schema::new(fields)
}

/// Schema for the training and test tables: the text columns plus one
/// column per task.
pub fn training_schema() -> Schema {
    let mut fields: Vec<Field> = TRAINING_TEXT_COLUMNS
        .iter()
        .map(|c| Field::new(*c, DataType::Utf8, true))
        .collect();
    fields.extend(task_fields());
    Schema::new(fields)
}

/// The same schema with every column as nullable `Utf8`.
pub fn all_utf8(schema: &Schema) -> Arc<Schema> {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| Field::new(f.name(), DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

fn task_fields() -> impl Iterator<Item = Field> {
    Task::ALL
        .into_iter()
        .map(|t| Field::new(t.key(), DataType::Utf8, true))
}

/// Extract a string value from an Arrow array (handles Utf8 and LargeUtf8).
pub fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

/// Like [`get_string`] for an optional column; null, missing, or non-string
/// cells read as "".
pub fn cell(col: Option<&dyn Array>, row: usize) -> String {
    col.and_then(|c| get_string(c, row)).unwrap_or_default()
}
