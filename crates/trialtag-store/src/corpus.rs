//! Training corpus assembly: base training rows plus deduplicated feedback.

use std::path::Path;

use tracing::info;
use trialtag_core::{LabelledRow, Paths, TrainingRow, dedup_against_training};

use crate::StoreError;
use crate::csv::read_csv_batches;
use crate::feedback::load_feedback;
use crate::rows::{TextSource, rows_from_batches};

/// Rows ready for fitting, with counts for the run summary.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub rows: Vec<LabelledRow>,
    pub training_rows: usize,
    pub feedback_rows: usize,
    /// Feedback rows dropped as exact copies of training rows.
    pub dropped: usize,
}

/// Load the base training table. A missing file yields no rows.
///
/// Text is `title`, `summary` and `inclusion_criteria` joined by spaces and
/// trimmed; a table with none of those columns is read from `text`.
pub fn load_training_rows(path: &Path) -> Result<Vec<TrainingRow>, StoreError> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let batches = read_csv_batches(path)?;
    rows_from_batches(&batches, TextSource::TrainingColumns, path)
}

/// Training rows followed by feedback rows that do not exactly repeat one.
pub fn assemble_corpus(paths: &Paths) -> Result<Corpus, StoreError> {
    let training = load_training_rows(&paths.train_csv())?;
    let feedback = load_feedback(&paths.feedback_csv())?;

    let loaded = feedback.len();
    let feedback = dedup_against_training(&training, feedback);
    let dropped = loaded - feedback.len();

    let training_rows = training.len();
    let feedback_rows = feedback.len();
    let mut rows = training;
    rows.extend(feedback);

    info!(training_rows, feedback_rows, dropped, "assembled training corpus");
    Ok(Corpus {
        rows,
        training_rows,
        feedback_rows,
        dropped,
    })
}
