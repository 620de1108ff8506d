//! Merge rule-based and statistical predictions with per-value provenance.

use std::collections::BTreeSet;

use trialtag_core::{Origin, PredictionSet, Provenance};

/// Union the two sources task by task and tag every merged value.
///
/// Only tasks present in at least one input appear in the output; a task
/// missing from one side counts as an empty set there. Pure and
/// deterministic.
pub fn merge_predictions(rule: &PredictionSet, ml: &PredictionSet) -> (PredictionSet, Provenance) {
    let empty = BTreeSet::new();
    let tasks: BTreeSet<_> = rule.tasks().chain(ml.tasks()).collect();

    let mut merged = PredictionSet::new();
    let mut provenance = Provenance::new();

    for task in tasks {
        let rset = rule.get(task).unwrap_or(&empty);
        let mset = ml.get(task).unwrap_or(&empty);

        let values: BTreeSet<String> = rset.union(mset).cloned().collect();
        let tags = provenance.entry(task);
        for v in &values {
            if let Some(origin) = Origin::from_membership(rset.contains(v), mset.contains(v)) {
                tags.insert(v.clone(), origin);
            }
        }
        merged.set(task, values);
    }

    (merged, provenance)
}
