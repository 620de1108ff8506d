//! Labelled text rows shared by the training table and the feedback store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Task → raw label cell (values joined by `;`). Missing tasks read as "".
pub type TaskValues = BTreeMap<Task, String>;

/// A text with one raw label cell per task.
///
/// Cells are kept exactly as they were read or typed; normalisation happens
/// only at comparison time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledRow {
    pub text: String,
    pub labels: TaskValues,
}

/// A reviewer correction appended to the feedback store.
pub type FeedbackRecord = LabelledRow;

/// A row of the base training table.
pub type TrainingRow = LabelledRow;

impl LabelledRow {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            labels: TaskValues::new(),
        }
    }

    pub fn with_label(mut self, task: Task, cell: impl Into<String>) -> Self {
        self.labels.insert(task, cell.into());
        self
    }

    /// Raw cell for `task`; the empty string when missing.
    pub fn label(&self, task: Task) -> &str {
        self.labels.get(&task).map(String::as_str).unwrap_or("")
    }

    /// Exact-match key: the text plus every task's raw cell in task order.
    pub fn exact_key(&self) -> Vec<&str> {
        std::iter::once(self.text.as_str())
            .chain(Task::ALL.iter().map(|t| self.label(*t)))
            .collect()
    }
}
