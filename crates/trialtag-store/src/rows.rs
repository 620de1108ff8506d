//! Conversion between record batches and [`LabelledRow`]s.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::record_batch::RecordBatch;
use trialtag_core::schema::{TEXT_COLUMN, TRAINING_TEXT_COLUMNS, cell, feedback_schema};
use trialtag_core::{LabelledRow, Task};

use crate::StoreError;

/// Where a table keeps its free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextSource {
    /// A single `text` column.
    TextColumn,
    /// `title`, `summary`, `inclusion_criteria` joined with spaces and
    /// trimmed; falls back to `text` when none of those columns exist.
    TrainingColumns,
}

pub(crate) fn rows_from_batches(
    batches: &[RecordBatch],
    source: TextSource,
    path: &Path,
) -> Result<Vec<LabelledRow>, StoreError> {
    let mut rows = Vec::new();

    for batch in batches {
        let parts: Vec<_> = TRAINING_TEXT_COLUMNS
            .iter()
            .map(|c| batch.column_by_name(c))
            .collect();
        let compose = source == TextSource::TrainingColumns && parts.iter().any(Option::is_some);

        let text_col = if compose {
            None
        } else {
            Some(
                batch
                    .column_by_name(TEXT_COLUMN)
                    .ok_or_else(|| StoreError::MissingColumn {
                        path: path.to_path_buf(),
                        column: TEXT_COLUMN.to_string(),
                    })?,
            )
        };
        let task_cols: Vec<(Task, _)> = Task::ALL
            .iter()
            .map(|t| (*t, batch.column_by_name(t.key())))
            .collect();

        for row in 0..batch.num_rows() {
            let text = match text_col {
                Some(col) => cell(Some(col.as_ref()), row),
                None => parts
                    .iter()
                    .map(|col| cell(col.map(|c| c.as_ref()), row))
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_string(),
            };

            let mut labelled = LabelledRow::new(text);
            for (task, col) in &task_cols {
                labelled
                    .labels
                    .insert(*task, cell(col.map(|c| c.as_ref()), row));
            }
            rows.push(labelled);
        }
    }

    Ok(rows)
}

/// One batch in feedback-table layout: `text` plus every task column.
pub(crate) fn rows_to_batch(rows: &[LabelledRow]) -> Result<RecordBatch, StoreError> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(1 + Task::ALL.len());
    columns.push(Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.text.as_str()),
    )));
    for task in Task::ALL {
        columns.push(Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.label(task)),
        )));
    }
    Ok(RecordBatch::try_new(Arc::new(feedback_schema()), columns)?)
}
