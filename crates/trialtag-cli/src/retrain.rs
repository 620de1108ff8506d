//! Retraining run: assemble the corpus, fit one centroid labeler per task,
//! write the run summary.

use std::io::Write;
use std::time::Instant;

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use trialtag_ai::{CentroidModel, CentroidSummary, Labelers};
use trialtag_core::{Paths, Task};
use trialtag_store::assemble_corpus;

pub struct RetrainSummary {
    /// Rows used for fitting: training plus surviving feedback.
    pub rows: usize,
    pub training_rows: usize,
    pub feedback_rows: usize,
    /// Feedback rows dropped as exact copies of training rows.
    pub dropped: usize,
    pub targets: Vec<(Task, CentroidSummary)>,
    pub elapsed_secs: f64,
}

/// Fit labelers for every task from the current corpus.
///
/// A task with no labelled rows is configured but absent, so it predicts
/// nothing rather than failing.
pub fn retrain(paths: &Paths, threshold: f32) -> anyhow::Result<(Labelers, RetrainSummary)> {
    let start = Instant::now();

    let corpus = assemble_corpus(paths).context("assembling training corpus")?;
    let texts: Vec<&str> = corpus.rows.iter().map(|r| r.text.as_str()).collect();

    let mut labelers = Labelers::empty();
    let mut targets = Vec::with_capacity(Task::ALL.len());

    for task in Task::ALL {
        let cells: Vec<&str> = corpus.rows.iter().map(|r| r.label(task)).collect();
        let rows_used = cells.iter().filter(|c| !c.trim().is_empty()).count();

        let model = CentroidModel::fit(&texts, &cells, threshold)
            .with_context(|| format!("fitting {task} labeler"))?;
        let summary = model.summary(rows_used);

        if summary.class_count == 0 {
            warn!(task = %task, "no labelled rows, labeler absent");
            labelers.mark_absent(task);
        } else {
            info!(
                task = %task,
                classes = summary.class_count,
                rows = rows_used,
                "fitted labeler"
            );
            labelers.insert(task, Box::new(model.into_labeler()));
        }
        targets.push((task, summary));
    }

    let summary = RetrainSummary {
        rows: corpus.rows.len(),
        training_rows: corpus.training_rows,
        feedback_rows: corpus.feedback_rows,
        dropped: corpus.dropped,
        targets,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    Ok((labelers, summary))
}

/// Labelers for prediction: refitted from the corpus, or every task absent
/// when the corpus cannot be loaded.
///
/// The fallback keeps every task configured, so the rule engine still runs;
/// an empty [`Labelers`] would short-circuit to the empty response.
pub fn labelers_or_absent(paths: &Paths, threshold: f32) -> Labelers {
    match retrain(paths, threshold) {
        Ok((labelers, _)) => labelers,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "labelers unavailable, predicting from rules only");
            let mut labelers = Labelers::empty();
            for task in Task::ALL {
                labelers.mark_absent(task);
            }
            labelers
        }
    }
}

/// Write `outputs/run_summary.txt`, replacing any previous run's.
pub fn write_run_summary(paths: &Paths, summary: &RetrainSummary) -> anyhow::Result<()> {
    let path = paths.run_summary();
    std::fs::create_dir_all(&paths.outputs_dir)
        .with_context(|| format!("creating {}", paths.outputs_dir.display()))?;

    let mut tmp = NamedTempFile::new_in(&paths.outputs_dir)
        .with_context(|| format!("creating temp file in {}", paths.outputs_dir.display()))?;
    tmp.write_all(render_run_summary(summary).as_bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.persist(&path)
        .with_context(|| format!("replacing {}", path.display()))?;

    info!(path = %path.display(), "wrote run summary");
    Ok(())
}

fn render_run_summary(summary: &RetrainSummary) -> String {
    let targets: Vec<&str> = summary.targets.iter().map(|(t, _)| t.key()).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "Training completed at {}.\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Rows used (train + feedback): {}\n",
        summary.rows
    ));
    out.push_str(&format!("Training rows: {}\n", summary.training_rows));
    out.push_str(&format!(
        "Feedback rows: {} kept, {} dropped as exact training duplicates\n",
        summary.feedback_rows, summary.dropped
    ));
    out.push_str(&format!("Targets (all multilabel): {}\n", targets.join(", ")));
    for (task, s) in &summary.targets {
        out.push_str(&format!(
            "  {:<16} {} classes from {} labelled rows\n",
            task.key(),
            s.class_count,
            s.rows_used
        ));
    }
    out
}
