//! Keyword rule engine.
//!
//! Each rule maps a keyword to label values for one or more tasks. A rule
//! fires when its keyword is a case-insensitive substring of the text, not a
//! whole token, so fragments like `er+` inside `er+/her2-` still match and
//! nested keywords can fire together. Built from Arrow RecordBatches of the
//! keyword mapping table.

use std::collections::{BTreeMap, BTreeSet};

use arrow::record_batch::RecordBatch;
use trialtag_core::normalize::split_multilabel;
use trialtag_core::schema::{KEYWORD_COLUMN, cell, get_string};
use trialtag_core::{PredictionSet, Task};

/// One keyword and the values it contributes per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// Lower-cased, trimmed keyword. Never empty inside a [`KeywordTable`].
    pub keyword: String,
    pub values: BTreeMap<Task, Vec<String>>,
}

impl KeywordRule {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.trim().to_lowercase(),
            values: BTreeMap::new(),
        }
    }

    /// Add the values of a `;`-joined cell for `task`.
    pub fn with_values(mut self, task: Task, cell: &str) -> Self {
        let values = split_multilabel(cell);
        if !values.is_empty() {
            self.values.entry(task).or_default().extend(values);
        }
        self
    }
}

/// The keyword mapping table, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

/// Output of [`match_keywords`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Every task in [`Task::ALL`], empty where nothing matched.
    pub predictions: PredictionSet,
    /// Sorted, deduplicated keywords that fired.
    pub matched_keywords: Vec<String>,
}

impl RuleMatch {
    /// The result of a matcher that never fires.
    pub fn empty() -> Self {
        Self {
            predictions: PredictionSet::empty_for(Task::ALL),
            matched_keywords: Vec::new(),
        }
    }
}

impl KeywordTable {
    /// Build a table from rules, dropping any whose keyword is empty.
    pub fn new(rules: impl IntoIterator<Item = KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut r| {
                r.keyword = r.keyword.trim().to_lowercase();
                r
            })
            .filter(|r| !r.keyword.is_empty())
            .collect();
        Self { rules }
    }

    /// Build a table from keyword mapping batches.
    ///
    /// Expects a `keyword` column; task columns are optional. Rows with a
    /// null or blank keyword are skipped.
    pub fn from_batches(batches: &[RecordBatch]) -> anyhow::Result<Self> {
        let mut rules = Vec::new();

        for batch in batches {
            let keyword_col = batch
                .column_by_name(KEYWORD_COLUMN)
                .ok_or_else(|| anyhow::anyhow!("missing '{KEYWORD_COLUMN}' column"))?;
            let task_cols: Vec<(Task, _)> = Task::ALL
                .iter()
                .map(|t| (*t, batch.column_by_name(t.key())))
                .collect();

            for row in 0..batch.num_rows() {
                let Some(keyword) = get_string(keyword_col.as_ref(), row) else {
                    continue;
                };
                let mut rule = KeywordRule::new(&keyword);
                if rule.keyword.is_empty() {
                    continue;
                }
                for (task, col) in &task_cols {
                    rule = rule.with_values(*task, &cell(col.map(|c| c.as_ref()), row));
                }
                rules.push(rule);
            }
        }

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Scan `text` against every rule.
///
/// Each firing rule unions its values into the per-task accumulators and
/// records its keyword. Cost is O(rules × text length).
pub fn match_keywords(text: &str, table: &KeywordTable) -> RuleMatch {
    let text_low = text.to_lowercase();
    let mut votes: BTreeMap<Task, BTreeSet<String>> = BTreeMap::new();
    let mut matched: BTreeSet<&str> = BTreeSet::new();

    for rule in &table.rules {
        if rule.keyword.is_empty() || !text_low.contains(rule.keyword.as_str()) {
            continue;
        }
        for (task, values) in &rule.values {
            votes.entry(*task).or_default().extend(values.iter().cloned());
        }
        matched.insert(&rule.keyword);
    }

    let predictions = Task::ALL
        .iter()
        .map(|t| (*t, votes.remove(t).unwrap_or_default()))
        .collect();

    RuleMatch {
        predictions,
        matched_keywords: matched.into_iter().map(str::to_string).collect(),
    }
}
