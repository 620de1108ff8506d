//! Centroid-based multilabel labeler.
//!
//! Represents each text as an L2-normalized bag of unigrams and bigrams over
//! [`clean`] text, computes one centroid per label value from the training
//! corpus, and predicts every label whose centroid has cosine similarity at
//! or above a threshold. Served through [`BinarizedLabeler`].

use std::collections::HashMap;

use trialtag_core::clean;
use trialtag_core::normalize::split_multilabel;

use crate::labeler::{BinarizedLabeler, IndicatorModel, LabelerError};

/// Sparse term vector: term → weight.
type TermVector = HashMap<String, f32>;

/// Centroid model for one task.
///
/// Classes are sorted; [`predict_indicators`](IndicatorModel::predict_indicators)
/// emits one indicator per class in that order.
#[derive(Debug, Clone)]
pub struct CentroidModel {
    classes: Vec<String>,
    centroids: Vec<TermVector>,
    threshold: f32,
}

/// Summary of centroid computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentroidSummary {
    pub class_count: usize,
    pub rows_used: usize,
}

impl CentroidModel {
    /// Fit centroids from parallel slices of texts and `;`-joined label cells.
    ///
    /// Rows with no labels do not contribute. A corpus with no labelled rows
    /// yields a model with no classes, which predicts nothing.
    pub fn fit<T: AsRef<str>, L: AsRef<str>>(
        texts: &[T],
        cells: &[L],
        threshold: f32,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            texts.len() == cells.len(),
            "{} texts but {} label cells",
            texts.len(),
            cells.len()
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&threshold),
            "threshold {threshold} outside [0, 1]"
        );

        let mut accum: HashMap<String, (TermVector, usize)> = HashMap::new();

        for (text, cell) in texts.iter().zip(cells) {
            let labels = split_multilabel(cell.as_ref());
            if labels.is_empty() {
                continue;
            }
            let vector = term_vector(text.as_ref());
            // Multi-select: contribute to each label's centroid.
            for label in labels {
                let entry = accum.entry(label).or_default();
                for (term, weight) in &vector {
                    *entry.0.entry(term.clone()).or_insert(0.0) += weight;
                }
                entry.1 += 1;
            }
        }

        let mut finalized = finalize_centroids(accum);
        finalized.sort_by(|a, b| a.0.cmp(&b.0));
        let (classes, centroids) = finalized.into_iter().unzip();

        Ok(Self {
            classes,
            centroids,
            threshold,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn summary(&self, rows_used: usize) -> CentroidSummary {
        CentroidSummary {
            class_count: self.classes.len(),
            rows_used,
        }
    }

    /// Cosine similarity of `text` to every class centroid, in class order.
    pub fn scores(&self, text: &str) -> Vec<f32> {
        let vector = term_vector(text);
        self.centroids.iter().map(|c| cosine_sim(&vector, c)).collect()
    }

    /// Wrap the model in the binarized-output adapter.
    pub fn into_labeler(self) -> BinarizedLabeler<CentroidModel> {
        let classes = self.classes.clone();
        BinarizedLabeler::new(self, classes)
    }
}

impl IndicatorModel for CentroidModel {
    fn predict_indicators(&self, text: &str) -> Result<Vec<bool>, LabelerError> {
        Ok(self
            .scores(text)
            .into_iter()
            .map(|sim| sim > 0.0 && sim >= self.threshold)
            .collect())
    }
}

/// Unigram and bigram counts over [`clean`] text, L2-normalized.
fn term_vector(text: &str) -> TermVector {
    let cleaned = clean(text);
    let tokens: Vec<&str> = cleaned.split(' ').filter(|t| !t.is_empty()).collect();

    let mut vector = TermVector::new();
    for token in &tokens {
        *vector.entry((*token).to_string()).or_insert(0.0) += 1.0;
    }
    for pair in tokens.windows(2) {
        *vector.entry(format!("{} {}", pair[0], pair[1])).or_insert(0.0) += 1.0;
    }

    normalize(&mut vector);
    vector
}

fn finalize_centroids(accum: HashMap<String, (TermVector, usize)>) -> Vec<(String, TermVector)> {
    let mut result = Vec::with_capacity(accum.len());
    for (label, (mut sum, count)) in accum {
        if count > 0 {
            for v in sum.values_mut() {
                *v /= count as f32;
            }
            normalize(&mut sum);
            result.push((label, sum));
        }
    }
    result
}

fn cosine_sim(a: &TermVector, b: &TermVector) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, x)| large.get(term).map(|y| x * y))
        .sum()
}

/// L2-normalize a vector in place.
fn normalize(v: &mut TermVector) {
    let norm: f32 = v.values().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.values_mut() {
            *x /= norm;
        }
    }
}
