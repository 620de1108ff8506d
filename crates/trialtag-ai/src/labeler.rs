//! Pluggable statistical labelers.
//!
//! A [`Labeler`] maps text to a set of label values for one task. Models come
//! in two shapes, each wrapped by an adapter chosen when the model is loaded:
//!
//! - [`DirectLabeler`] for models that emit label strings
//! - [`BinarizedLabeler`] for models that emit one indicator per known class

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use trialtag_core::Task;

#[derive(Debug, Error)]
pub enum LabelerError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned {got} indicators for {expected} classes")]
    IndicatorWidth { expected: usize, got: usize },
}

/// Text → label values for a single task.
pub trait Labeler: Send + Sync {
    fn predict(&self, text: &str) -> Result<BTreeSet<String>, LabelerError>;
}

/// A model whose output is label strings.
pub trait TextModel: Send + Sync {
    fn predict_raw(&self, text: &str) -> Result<Vec<String>, LabelerError>;
}

/// A model whose output is one indicator per class, in class order.
pub trait IndicatorModel: Send + Sync {
    fn predict_indicators(&self, text: &str) -> Result<Vec<bool>, LabelerError>;
}

/// Adapter for [`TextModel`]: trims outputs and drops empty strings.
pub struct DirectLabeler<M> {
    model: M,
}

impl<M: TextModel> DirectLabeler<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: TextModel> Labeler for DirectLabeler<M> {
    fn predict(&self, text: &str) -> Result<BTreeSet<String>, LabelerError> {
        Ok(self
            .model
            .predict_raw(text)?
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect())
    }
}

/// Adapter for [`IndicatorModel`]: maps set indicators back to class names.
pub struct BinarizedLabeler<M> {
    model: M,
    classes: Vec<String>,
}

impl<M: IndicatorModel> BinarizedLabeler<M> {
    pub fn new(model: M, classes: Vec<String>) -> Self {
        Self { model, classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl<M: IndicatorModel> Labeler for BinarizedLabeler<M> {
    fn predict(&self, text: &str) -> Result<BTreeSet<String>, LabelerError> {
        let indicators = self.model.predict_indicators(text)?;
        if indicators.len() != self.classes.len() {
            return Err(LabelerError::IndicatorWidth {
                expected: self.classes.len(),
                got: indicators.len(),
            });
        }
        Ok(self
            .classes
            .iter()
            .zip(indicators)
            .filter(|(_, on)| *on)
            .map(|(class, _)| class.clone())
            .collect())
    }
}

/// One labeler slot per configured task.
///
/// A slot holding `None` is a task whose model is absent; it predicts the
/// empty set. A `Labelers` with no slots means no labelers are configured.
#[derive(Default)]
pub struct Labelers {
    slots: BTreeMap<Task, Option<Box<dyn Labeler>>>,
}

impl Labelers {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: Task, labeler: Box<dyn Labeler>) {
        self.slots.insert(task, Some(labeler));
    }

    /// Configure `task` with no model behind it.
    pub fn mark_absent(&mut self, task: Task) {
        self.slots.insert(task, None);
    }

    pub fn with(mut self, task: Task, labeler: impl Labeler + 'static) -> Self {
        self.insert(task, Box::new(labeler));
        self
    }

    /// Configured tasks, in task order.
    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.slots.keys().copied()
    }

    /// The labeler for `task`; `None` when absent or not configured.
    pub fn get(&self, task: Task) -> Option<&dyn Labeler> {
        self.slots.get(&task).and_then(|s| s.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of configured tasks with a model behind them.
    pub fn loaded(&self) -> usize {
        self.slots.values().filter(|s| s.is_some()).count()
    }
}
