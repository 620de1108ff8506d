//! Per-task prediction sets and the provenance of each predicted value.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Task → sorted, deduplicated label values from one prediction source.
///
/// A task key may be present with an empty set. Present-but-empty and absent
/// are distinct: merging only emits tasks present in one of its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionSet(BTreeMap<Task, BTreeSet<String>>);

impl PredictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with every given task present and empty.
    pub fn empty_for(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self(tasks.into_iter().map(|t| (t, BTreeSet::new())).collect())
    }

    /// Values for `task`, inserting an empty set if the task is absent.
    pub fn entry(&mut self, task: Task) -> &mut BTreeSet<String> {
        self.0.entry(task).or_default()
    }

    pub fn insert(&mut self, task: Task, value: impl Into<String>) {
        self.entry(task).insert(value.into());
    }

    /// Replace the values for `task`.
    pub fn set(&mut self, task: Task, values: BTreeSet<String>) {
        self.0.insert(task, values);
    }

    pub fn get(&self, task: Task) -> Option<&BTreeSet<String>> {
        self.0.get(&task)
    }

    pub fn contains_task(&self, task: Task) -> bool {
        self.0.contains_key(&task)
    }

    /// Values for `task` in sorted order; empty when the task is absent.
    pub fn values(&self, task: Task) -> impl Iterator<Item = &str> {
        self.0.get(&task).into_iter().flatten().map(String::as_str)
    }

    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Task, &BTreeSet<String>)> {
        self.0.iter().map(|(t, v)| (*t, v))
    }

    /// True when no task holds any value.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Values for `task` joined with `", "`, as shown to a reviewer.
    pub fn display_values(&self, task: Task) -> String {
        self.values(task).collect::<Vec<_>>().join(", ")
    }
}

impl FromIterator<(Task, BTreeSet<String>)> for PredictionSet {
    fn from_iter<I: IntoIterator<Item = (Task, BTreeSet<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which prediction source(s) produced a merged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "rule")]
    Rule,
    #[serde(rename = "ml")]
    Ml,
    #[serde(rename = "rule+ml")]
    RuleAndMl,
}

impl Origin {
    /// Tag for a value given its membership in the rule and ml sets.
    /// `None` when it is in neither.
    pub fn from_membership(in_rule: bool, in_ml: bool) -> Option<Self> {
        match (in_rule, in_ml) {
            (true, true) => Some(Self::RuleAndMl),
            (true, false) => Some(Self::Rule),
            (false, true) => Some(Self::Ml),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Ml => "ml",
            Self::RuleAndMl => "rule+ml",
        }
    }

    /// The tag the value would carry with the two sources swapped.
    pub fn swapped(&self) -> Self {
        match self {
            Self::Rule => Self::Ml,
            Self::Ml => Self::Rule,
            Self::RuleAndMl => Self::RuleAndMl,
        }
    }
}

/// Task → value → origin tag for every value of a merged [`PredictionSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Provenance(BTreeMap<Task, BTreeMap<String, Origin>>);

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty_for(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self(tasks.into_iter().map(|t| (t, BTreeMap::new())).collect())
    }

    pub fn entry(&mut self, task: Task) -> &mut BTreeMap<String, Origin> {
        self.0.entry(task).or_default()
    }

    pub fn get(&self, task: Task) -> Option<&BTreeMap<String, Origin>> {
        self.0.get(&task)
    }

    pub fn origin(&self, task: Task, value: &str) -> Option<Origin> {
        self.0.get(&task).and_then(|m| m.get(value)).copied()
    }

    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Task, &BTreeMap<String, Origin>)> {
        self.0.iter().map(|(t, m)| (*t, m))
    }
}
