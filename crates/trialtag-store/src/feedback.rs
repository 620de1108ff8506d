//! The feedback store: a CSV table of reviewer corrections.

use std::path::Path;

use tracing::info;
use trialtag_core::{FeedbackRecord, LabelledRow, TaskValues, feedback_exists, validate_submission};

use crate::StoreError;
use crate::csv::{read_csv_batches, write_csv_batch};
use crate::rows::{TextSource, rows_from_batches, rows_to_batch};

/// Outcome of [`submit_feedback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Appended to the store.
    Accepted,
    /// An equivalent correction was already stored; nothing written.
    Duplicate,
}

/// Load every stored correction. A missing file is an empty store.
pub fn load_feedback(path: &Path) -> Result<Vec<FeedbackRecord>, StoreError> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let batches = read_csv_batches(path)?;
    rows_from_batches(&batches, TextSource::TextColumn, path)
}

/// Replace the store with `records`.
pub fn write_feedback(path: &Path, records: &[FeedbackRecord]) -> Result<(), StoreError> {
    let batch = rows_to_batch(records)?;
    write_csv_batch(path, &batch)
}

/// Append one record, rewriting the whole file.
pub fn append_feedback(path: &Path, record: FeedbackRecord) -> Result<(), StoreError> {
    let mut records = load_feedback(path)?;
    records.push(record);
    write_feedback(path, &records)
}

/// Validate a correction and append it unless an equivalent one is stored.
///
/// Cells and text are trimmed before storage; everything else is kept as
/// typed.
pub fn submit_feedback(
    path: &Path,
    text: &str,
    candidate: &TaskValues,
) -> Result<Submission, StoreError> {
    let labels = validate_submission(candidate)?;
    let mut records = load_feedback(path)?;

    if feedback_exists(&records, text, &labels) {
        info!(path = %path.display(), "feedback already stored");
        return Ok(Submission::Duplicate);
    }

    records.push(LabelledRow {
        text: text.trim().to_string(),
        labels,
    });
    write_feedback(path, &records)?;
    info!(path = %path.display(), total = records.len(), "feedback saved");
    Ok(Submission::Accepted)
}
