//! Vertical card display for predictions.
//!
//! Renders a [`PredictionOutput`] grouped by source, with the provenance of
//! every merged value and the keywords that fired.

use std::fmt::Write;

use trialtag_ai::PredictionOutput;
use trialtag_core::{PredictionSet, Task};

const MAX_TEXT_CHARS: usize = 160;

// ── Public API ──

/// Print a prediction as a card.
pub fn print_prediction_card(text: &str, output: &PredictionOutput) {
    print!("{}", render_prediction_card(text, output));
}

pub fn render_prediction_card(text: &str, output: &PredictionOutput) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Prediction ===");
    let _ = writeln!(out, "{}", truncate(text.trim(), MAX_TEXT_CHARS));
    let _ = writeln!(out);

    let _ = writeln!(out, "Final");
    for task in Task::ALL {
        let tagged: Vec<String> = output
            .merged
            .values(task)
            .map(|v| match output.provenance.origin(task, v) {
                Some(origin) => format!("{v} [{}]", origin.as_str()),
                None => v.to_string(),
            })
            .collect();
        let shown = if tagged.is_empty() {
            "-".to_string()
        } else {
            tagged.join(", ")
        };
        let _ = writeln!(out, "  {:<18} {}", task.key(), shown);
    }
    let _ = writeln!(out);

    render_section(&mut out, "Rule-based", &output.rule_based);
    render_section(&mut out, "Model", &output.ml_only);

    let explanations = &output.explanations;
    if !explanations.matched_keywords.is_empty() {
        let _ = writeln!(out, "Matched keywords");
        let _ = writeln!(out, "  {}", explanations.matched_keywords.join(", "));
        let _ = writeln!(out);
    }
    if !explanations.degraded_tasks.is_empty() {
        let tasks: Vec<&str> = explanations.degraded_tasks.iter().map(Task::key).collect();
        let _ = writeln!(out, "Degraded (labeler failed)");
        let _ = writeln!(out, "  {}", tasks.join(", "));
        let _ = writeln!(out);
    }

    out
}

// ── Section rendering ──

fn render_section(out: &mut String, header: &str, set: &PredictionSet) {
    // Skip sources that contributed nothing.
    if set.is_empty() {
        return;
    }

    let _ = writeln!(out, "{header}");
    for (task, values) in set.iter() {
        if values.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {:<18} {}", task.key(), set.display_values(task));
    }
    let _ = writeln!(out);
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
