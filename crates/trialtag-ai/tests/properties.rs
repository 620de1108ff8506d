//! Property tests for normalisation, keyword matching, merging, and the
//! duplicate-feedback check.

use std::collections::BTreeSet;

use proptest::prelude::*;
use trialtag_ai::{KeywordRule, KeywordTable, match_keywords, merge_predictions};
use trialtag_core::{
    LabelledRow, Origin, PredictionSet, Task, TaskValues, canonical_labels, clean, feedback_exists,
};

// ============================================================================
// Strategies
// ============================================================================

fn task_strategy() -> impl Strategy<Value = Task> {
    prop_oneof![
        Just(Task::DiseaseType),
        Just(Task::StageSubtype),
        Just(Task::LineOfTherapy),
        Just(Task::Biomarker),
    ]
}

/// Free text mixing clinical abbreviations, symbols, and noise.
fn clinical_text_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("NSCLC".to_string()),
        Just("crc".to_string()),
        Just("ER+".to_string()),
        Just("pr+".to_string()),
        Just("MSI-H".to_string()),
        Just("er+her2".to_string()),
        Just("/".to_string()),
        Just("\t".to_string()),
        "[A-Za-z0-9 +\\-/().,;:]{0,12}",
    ];
    prop::collection::vec(fragment, 0..8).prop_map(|parts| parts.concat())
}

fn label_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Lung Cancer".to_string()),
        Just("NSCLC".to_string()),
        Just("Breast Cancer".to_string()),
        Just("EGFR".to_string()),
        Just("Stage IV".to_string()),
        Just("1L".to_string()),
    ]
}

fn prediction_set_strategy() -> impl Strategy<Value = PredictionSet> {
    prop::collection::btree_map(
        task_strategy(),
        prop::collection::btree_set(label_strategy(), 0..4),
        0..4,
    )
    .prop_map(|m| m.into_iter().collect())
}

fn rule_strategy() -> impl Strategy<Value = KeywordRule> {
    (
        prop_oneof![
            Just("nsclc"),
            Just("er+"),
            Just("egfr"),
            Just("stage iv"),
            Just("first-line"),
            Just("lung"),
        ],
        prop::collection::vec((task_strategy(), label_strategy()), 0..3),
    )
        .prop_map(|(keyword, values)| {
            values
                .into_iter()
                .fold(KeywordRule::new(keyword), |rule, (task, value)| {
                    rule.with_values(task, &value)
                })
        })
}

fn match_text_strategy() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("NSCLC "),
        Just("ER+/HER2- "),
        Just("egfr "),
        Just("Stage IV "),
        Just("First-Line "),
        Just("lungs "),
        Just("other "),
    ];
    prop::collection::vec(fragment, 0..6).prop_map(|parts| parts.concat())
}

/// Shuffle, re-case, and re-delimit a list of labels into one cell.
fn respell(values: &[String], upper: bool, comma: bool, reverse: bool) -> String {
    let mut items: Vec<String> = values
        .iter()
        .map(|v| if upper { v.to_uppercase() } else { v.to_lowercase() })
        .collect();
    if reverse {
        items.reverse();
    }
    items.join(if comma { " ,  " } else { ";" })
}

// ============================================================================
// Normaliser
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn clean_is_idempotent(text in clinical_text_strategy()) {
        let once = clean(&text);
        prop_assert_eq!(clean(&once), once);
    }

    #[test]
    fn clean_output_uses_allowed_characters(text in clinical_text_strategy()) {
        let out = clean(&text);
        prop_assert!(out
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' || c == '-' || c == '+'));
        prop_assert!(!out.contains("  "));
        prop_assert_eq!(out.trim(), out.as_str());
    }
}

// ============================================================================
// Keyword matcher
// ============================================================================

proptest! {
    #[test]
    fn matched_rules_contribute_all_values(
        rules in prop::collection::vec(rule_strategy(), 0..8),
        text in match_text_strategy(),
    ) {
        let table = KeywordTable::new(rules.clone());
        let m = match_keywords(&text, &table);
        let text_low = text.to_lowercase();

        for rule in &rules {
            if text_low.contains(rule.keyword.as_str()) {
                prop_assert!(m.matched_keywords.contains(&rule.keyword));
                for (task, values) in &rule.values {
                    for v in values {
                        prop_assert!(m.predictions.get(*task).unwrap().contains(v));
                    }
                }
            }
        }
    }

    #[test]
    fn every_value_is_attributable(
        rules in prop::collection::vec(rule_strategy(), 0..8),
        text in match_text_strategy(),
    ) {
        let table = KeywordTable::new(rules.clone());
        let m = match_keywords(&text, &table);

        for (task, values) in m.predictions.iter() {
            for v in values {
                let attributed = rules.iter().any(|r| {
                    m.matched_keywords.contains(&r.keyword)
                        && r.values.get(&task).is_some_and(|vs| vs.contains(v))
                });
                prop_assert!(attributed, "{v:?} for {task} has no matched rule");
            }
        }
    }
}

// ============================================================================
// Ensemble merger
// ============================================================================

proptest! {
    #[test]
    fn merge_is_commutative(a in prediction_set_strategy(), b in prediction_set_strategy()) {
        let (ab, prov_ab) = merge_predictions(&a, &b);
        let (ba, prov_ba) = merge_predictions(&b, &a);
        prop_assert_eq!(&ab, &ba);

        for (task, tags) in prov_ab.iter() {
            for (value, origin) in tags {
                prop_assert_eq!(prov_ba.origin(task, value), Some(origin.swapped()));
            }
        }
    }

    #[test]
    fn provenance_matches_membership(a in prediction_set_strategy(), b in prediction_set_strategy()) {
        let (merged, prov) = merge_predictions(&a, &b);
        let tasks: BTreeSet<Task> = a.tasks().chain(b.tasks()).collect();
        prop_assert_eq!(merged.tasks().collect::<BTreeSet<_>>(), tasks);

        for (task, values) in merged.iter() {
            let tags = prov.get(task).unwrap();
            prop_assert_eq!(tags.len(), values.len());
            for v in values {
                let in_rule = a.get(task).is_some_and(|s| s.contains(v));
                let in_ml = b.get(task).is_some_and(|s| s.contains(v));
                let expected = Origin::from_membership(in_rule, in_ml);
                prop_assert!(expected.is_some());
                prop_assert_eq!(tags.get(v).copied(), expected);
            }
        }
    }
}

// ============================================================================
// Feedback reconciler
// ============================================================================

proptest! {
    #[test]
    fn respelled_feedback_is_duplicate(
        text in "[A-Za-z ]{1,20}",
        labels in prop::collection::btree_set(label_strategy(), 1..4),
        task in task_strategy(),
        upper in any::<bool>(),
        comma in any::<bool>(),
        reverse in any::<bool>(),
    ) {
        let labels: Vec<String> = labels.into_iter().collect();
        let stored = LabelledRow::new(text.clone()).with_label(task, labels.join("; "));

        let mut candidate = TaskValues::new();
        candidate.insert(task, respell(&labels, upper, comma, reverse));
        let resubmitted = format!("  {}  ", text.to_uppercase());

        prop_assert!(feedback_exists(&[stored], &resubmitted, &candidate));
    }

    #[test]
    fn changed_label_is_not_duplicate(
        text in "[a-z]{1,12}",
        labels in prop::collection::btree_set(label_strategy(), 1..4),
        extra in label_strategy(),
        task in task_strategy(),
    ) {
        let labels: Vec<String> = labels.into_iter().collect();
        prop_assume!(!labels.contains(&extra));
        let stored = LabelledRow::new(text.clone()).with_label(task, labels.join("; "));

        let mut with_extra = labels.clone();
        with_extra.push(extra);
        let mut candidate = TaskValues::new();
        candidate.insert(task, with_extra.join("; "));

        prop_assert_ne!(
            canonical_labels(&labels.join("; ")),
            canonical_labels(&with_extra.join("; "))
        );
        prop_assert!(!feedback_exists(&[stored], &text, &candidate));
    }
}
