//! Feedback reconciliation: duplicate detection at submission time and
//! exact-match dedup against the training table at retraining time.
//!
//! The two comparisons differ in strength.
//! [`feedback_exists`] normalises case, whitespace, delimiters and value
//! order, so a reviewer cannot submit the same correction twice.
//! [`dedup_against_training`] compares raw strings only, so near-duplicates
//! that differ in ordering or spacing still reach the training corpus.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::normalize::{canonical_labels, canonical_text};
use crate::record::{FeedbackRecord, TaskValues, TrainingRow};
use crate::task::Task;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("feedback cannot be empty: enter at least one label value")]
    Empty,
}

/// Whether `store` already holds a correction equal to `(text, candidate)`.
///
/// A row matches when its [`canonical_text`] equals the candidate's and, for
/// every task, its [`canonical_labels`] key equals the candidate's. Missing
/// cells compare as "".
pub fn feedback_exists(store: &[FeedbackRecord], text: &str, candidate: &TaskValues) -> bool {
    if store.is_empty() {
        return false;
    }

    let target_text = canonical_text(text);
    let target_labels: Vec<String> = Task::ALL
        .iter()
        .map(|t| canonical_labels(candidate.get(t).map(String::as_str).unwrap_or("")))
        .collect();

    store.iter().any(|row| {
        canonical_text(&row.text) == target_text
            && Task::ALL
                .iter()
                .zip(&target_labels)
                .all(|(t, target)| canonical_labels(row.label(*t)) == *target)
    })
}

/// Drop feedback rows that exactly match a training row.
///
/// A feedback row is dropped iff some training row has the same text string
/// and the same raw cell for every task. Surviving rows keep their order;
/// rows duplicated within the feedback store itself are all kept.
pub fn dedup_against_training(
    training: &[TrainingRow],
    feedback: Vec<FeedbackRecord>,
) -> Vec<FeedbackRecord> {
    if feedback.is_empty() {
        return feedback;
    }

    let seen: HashSet<Vec<&str>> = training.iter().map(|r| r.exact_key()).collect();
    let before = feedback.len();
    let kept: Vec<FeedbackRecord> = feedback
        .into_iter()
        .filter(|r| !seen.contains(&r.exact_key()))
        .collect();

    debug!(before, kept = kept.len(), "deduplicated feedback against training");
    kept
}

/// Trim every task's cell and reject a submission with no values at all.
///
/// The returned map holds every task in [`Task::ALL`].
pub fn validate_submission(candidate: &TaskValues) -> Result<TaskValues, FeedbackError> {
    let trimmed: TaskValues = Task::ALL
        .iter()
        .map(|t| {
            let cell = candidate.get(t).map(|v| v.trim()).unwrap_or("");
            (*t, cell.to_string())
        })
        .collect();

    if trimmed.values().all(String::is_empty) {
        return Err(FeedbackError::Empty);
    }
    Ok(trimmed)
}
