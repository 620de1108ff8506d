//! The `predict` entry point: rule engine, statistical labelers, merge.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};
use trialtag_core::{PredictionSet, Provenance, Task, clean};

use crate::ensemble::merge_predictions;
use crate::labeler::Labelers;
use crate::rules::{KeywordTable, RuleMatch, match_keywords};

/// Why a prediction looks the way it does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Explanations {
    /// Keywords from the rule table that fired, sorted.
    pub matched_keywords: Vec<String>,
    /// Tasks whose labeler failed and were degraded to an empty set.
    pub degraded_tasks: Vec<Task>,
}

/// Full prediction for one text.
///
/// Every response has the same shape; an empty input yields empty values,
/// never a different structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionOutput {
    #[serde(rename = "final")]
    pub merged: PredictionSet,
    pub rule_based: PredictionSet,
    pub ml_only: PredictionSet,
    pub provenance: Provenance,
    pub explanations: Explanations,
}

impl PredictionOutput {
    /// The all-empty response: every task present with no values.
    pub fn empty() -> Self {
        Self {
            merged: PredictionSet::empty_for(Task::ALL),
            rule_based: PredictionSet::empty_for(Task::ALL),
            ml_only: PredictionSet::empty_for(Task::ALL),
            provenance: Provenance::empty_for(Task::ALL),
            explanations: Explanations::default(),
        }
    }
}

/// Predict labels for `text`.
///
/// - Blank text, or no labelers configured: [`PredictionOutput::empty`].
/// - `keywords` is `None` when the mapping table could not be loaded; the
///   rule side then contributes empty sets.
/// - Rule matching runs on the raw text; labelers see [`clean`] text.
/// - A failing labeler degrades its task to an empty set without affecting
///   other tasks.
pub fn predict(text: &str, keywords: Option<&KeywordTable>, labelers: &Labelers) -> PredictionOutput {
    if text.trim().is_empty() || labelers.is_empty() {
        return PredictionOutput::empty();
    }

    let RuleMatch {
        predictions: rule_based,
        matched_keywords,
    } = match keywords {
        Some(table) => match_keywords(text, table),
        None => RuleMatch::empty(),
    };

    let cleaned = clean(text);
    // Unconfigured tasks stay present and empty, matching the empty response.
    let mut ml_only = PredictionSet::empty_for(Task::ALL);
    let mut degraded_tasks = Vec::new();

    for task in labelers.tasks() {
        let values = match labelers.get(task) {
            None => BTreeSet::new(),
            Some(labeler) => match labeler.predict(&cleaned) {
                Ok(values) => values,
                Err(e) => {
                    warn!(task = %task, error = %e, "labeler failed, degrading task to empty");
                    degraded_tasks.push(task);
                    BTreeSet::new()
                }
            },
        };
        ml_only.set(task, values);
    }

    let (merged, provenance) = merge_predictions(&rule_based, &ml_only);
    debug!(
        matched = matched_keywords.len(),
        degraded = degraded_tasks.len(),
        "prediction complete"
    );

    PredictionOutput {
        merged,
        rule_based,
        ml_only,
        provenance,
        explanations: Explanations {
            matched_keywords,
            degraded_tasks,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeler::{DirectLabeler, LabelerError, TextModel};
    use crate::rules::KeywordRule;
    use std::sync::Mutex;
    use trialtag_core::Origin;

    struct Fixed(&'static [&'static str]);

    impl TextModel for Fixed {
        fn predict_raw(&self, _text: &str) -> Result<Vec<String>, LabelerError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Failing;

    impl TextModel for Failing {
        fn predict_raw(&self, _text: &str) -> Result<Vec<String>, LabelerError> {
            Err(LabelerError::Inference("model file corrupt".into()))
        }
    }

    /// Records the text it was given.
    struct Recording(Mutex<Vec<String>>);

    impl TextModel for Recording {
        fn predict_raw(&self, text: &str) -> Result<Vec<String>, LabelerError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(vec![])
        }
    }

    fn table() -> KeywordTable {
        KeywordTable::new([
            KeywordRule::new("nsclc").with_values(Task::DiseaseType, "Lung Cancer"),
            KeywordRule::new("egfr+").with_values(Task::Biomarker, "EGFR"),
        ])
    }

    fn labelers() -> Labelers {
        Labelers::empty()
            .with(Task::DiseaseType, DirectLabeler::new(Fixed(&["Lung Cancer", "NSCLC"])))
            .with(Task::StageSubtype, DirectLabeler::new(Fixed(&["Stage IV"])))
    }

    #[test]
    fn merges_rules_and_models() {
        let out = predict("Patient with EGFR+ Stage IV NSCLC", Some(&table()), &labelers());

        assert_eq!(
            out.merged.values(Task::DiseaseType).collect::<Vec<_>>(),
            vec!["Lung Cancer", "NSCLC"]
        );
        assert_eq!(
            out.provenance.origin(Task::DiseaseType, "Lung Cancer"),
            Some(Origin::RuleAndMl)
        );
        assert_eq!(out.provenance.origin(Task::DiseaseType, "NSCLC"), Some(Origin::Ml));
        assert_eq!(out.provenance.origin(Task::Biomarker, "EGFR"), Some(Origin::Rule));
        assert_eq!(out.explanations.matched_keywords, vec!["egfr+", "nsclc"]);
        assert!(out.explanations.degraded_tasks.is_empty());
    }

    #[test]
    fn every_task_in_final() {
        let out = predict("nsclc", Some(&table()), &labelers());
        assert_eq!(out.merged.tasks().collect::<Vec<_>>(), Task::ALL.to_vec());
        assert_eq!(out.rule_based.tasks().count(), Task::ALL.len());
        assert_eq!(out.ml_only.tasks().collect::<Vec<_>>(), Task::ALL.to_vec());
        assert!(out.ml_only.get(Task::Biomarker).unwrap().is_empty());
        assert_eq!(out.provenance.tasks().collect::<Vec<_>>(), Task::ALL.to_vec());
    }

    #[test]
    fn blank_text_is_empty_response() {
        for text in ["", "   ", "\n\t"] {
            let out = predict(text, Some(&table()), &labelers());
            assert_eq!(out, PredictionOutput::empty());
        }
    }

    #[test]
    fn no_labelers_is_empty_response() {
        let out = predict("nsclc", Some(&table()), &Labelers::empty());
        assert_eq!(out, PredictionOutput::empty());
    }

    #[test]
    fn empty_response_has_normal_shape() {
        let empty = serde_json::to_value(PredictionOutput::empty()).unwrap();
        let normal = serde_json::to_value(predict("nsclc", Some(&table()), &labelers())).unwrap();

        let keys = |v: &serde_json::Value| -> Vec<String> {
            v.as_object().unwrap().keys().cloned().collect()
        };
        assert_eq!(keys(&empty), keys(&normal));
        for section in ["final", "rule_based", "ml_only", "provenance", "explanations"] {
            assert_eq!(keys(&empty[section]), keys(&normal[section]), "{section}");
        }
        assert_eq!(empty["final"]["biomarker"], serde_json::json!([]));
    }

    #[test]
    fn single_labeler_response_keeps_full_shape() {
        let labelers = Labelers::empty().with(Task::DiseaseType, DirectLabeler::new(Fixed(&["X"])));
        let normal = serde_json::to_value(predict("some trial", None, &labelers)).unwrap();
        let empty = serde_json::to_value(predict("   ", None, &labelers)).unwrap();

        for section in ["final", "rule_based", "ml_only", "provenance"] {
            let keys = |v: &serde_json::Value| -> Vec<String> {
                v[section].as_object().unwrap().keys().cloned().collect()
            };
            assert_eq!(keys(&normal), keys(&empty), "{section}");
        }
        assert_eq!(normal["ml_only"]["biomarker"], serde_json::json!([]));
    }

    #[test]
    fn missing_keyword_table_degrades_to_models_only() {
        let out = predict("nsclc", None, &labelers());
        assert!(out.rule_based.is_empty());
        assert_eq!(out.rule_based.tasks().count(), Task::ALL.len());
        assert!(out.explanations.matched_keywords.is_empty());
        assert_eq!(out.provenance.origin(Task::DiseaseType, "Lung Cancer"), Some(Origin::Ml));
    }

    #[test]
    fn failing_labeler_is_isolated() {
        let labelers = labelers().with(Task::Biomarker, DirectLabeler::new(Failing));
        let out = predict("nsclc", Some(&table()), &labelers);

        assert_eq!(out.explanations.degraded_tasks, vec![Task::Biomarker]);
        assert!(out.ml_only.get(Task::Biomarker).unwrap().is_empty());
        assert_eq!(
            out.ml_only.values(Task::StageSubtype).collect::<Vec<_>>(),
            vec!["Stage IV"]
        );
    }

    #[test]
    fn absent_labeler_predicts_empty_without_degrading() {
        let mut labelers = labelers();
        labelers.mark_absent(Task::LineOfTherapy);
        let out = predict("nsclc", Some(&table()), &labelers);

        assert!(out.ml_only.get(Task::LineOfTherapy).unwrap().is_empty());
        assert!(out.explanations.degraded_tasks.is_empty());
    }

    #[test]
    fn labelers_receive_clean_text_and_rules_see_raw() {
        let recorder = std::sync::Arc::new(Recording(Mutex::new(Vec::new())));

        struct Shared(std::sync::Arc<Recording>);
        impl TextModel for Shared {
            fn predict_raw(&self, text: &str) -> Result<Vec<String>, LabelerError> {
                self.0.predict_raw(text)
            }
        }

        let labelers =
            Labelers::empty().with(Task::Biomarker, DirectLabeler::new(Shared(recorder.clone())));
        let out = predict("EGFR+ (NSCLC)", Some(&table()), &labelers);

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["egfr+ non small cell lung cancer".to_string()]
        );
        // The raw text keeps "nsclc" for the rule engine.
        assert_eq!(out.explanations.matched_keywords, vec!["egfr+", "nsclc"]);
    }
}
