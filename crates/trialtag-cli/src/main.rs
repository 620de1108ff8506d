//! trialtag CLI
//!
//! Tags clinical-trial text with disease type, stage/subtype, line of therapy
//! and biomarker labels by merging a keyword rule table with per-task
//! statistical labelers, and records reviewer corrections for retraining.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trialtag_ai::{KeywordTable, predict};
use trialtag_core::{Paths, Task, TaskValues, clean, join_multilabel, split_multilabel};
use trialtag_store::{Submission, ensure_layout, read_csv_batches, submit_feedback};

mod display;
mod retrain;

#[derive(Parser)]
#[command(name = "trialtag")]
#[command(version, about = "Multilabel tagging of clinical-trial text")]
struct Cli {
    /// Directory holding the training, keyword and feedback tables.
    #[arg(long, global = true, env = "TRIALTAG_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, global = true, env = "TRIALTAG_MODELS_DIR", default_value = "models")]
    models_dir: PathBuf,

    /// Directory for run summaries.
    #[arg(long, global = true, env = "TRIALTAG_OUTPUTS_DIR", default_value = "outputs")]
    outputs_dir: PathBuf,

    /// Cosine similarity a label centroid must reach to be predicted.
    #[arg(long, global = true, env = "TRIALTAG_THRESHOLD", default_value_t = 0.2)]
    threshold: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict labels for a trial description.
    Predict {
        /// Free text (title, summary, criteria).
        text: String,
        /// Print the full response as JSON instead of a card.
        #[arg(long)]
        json: bool,
    },

    /// Record a reviewer correction.
    ///
    /// Repeat a label flag, or separate values with `;`, to give a task
    /// several values.
    Feedback {
        #[arg(long)]
        text: String,
        #[arg(long)]
        disease_type: Vec<String>,
        #[arg(long)]
        stage_subtype: Vec<String>,
        #[arg(long)]
        line_of_therapy: Vec<String>,
        #[arg(long)]
        biomarker: Vec<String>,
    },

    /// Refit the labelers from training data plus feedback and write the run summary.
    Retrain,

    /// Show the normalized form of a text.
    Clean { text: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths {
        data_dir: cli.data_dir,
        models_dir: cli.models_dir,
        outputs_dir: cli.outputs_dir,
    };

    match cli.command {
        Commands::Clean { text } => {
            println!("{}", clean(&text));
        }

        Commands::Predict { text, json } => {
            ensure_layout(&paths).context("preparing data directory")?;
            let keywords = load_keyword_table(&paths.keywords_csv());
            let labelers = retrain::labelers_or_absent(&paths, cli.threshold);

            let output = predict(&text, keywords.as_ref(), &labelers);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output).context("serializing prediction")?
                );
            } else {
                display::print_prediction_card(&text, &output);
            }
        }

        Commands::Feedback {
            text,
            disease_type,
            stage_subtype,
            line_of_therapy,
            biomarker,
        } => {
            ensure_layout(&paths).context("preparing data directory")?;
            let candidate: TaskValues = [
                (Task::DiseaseType, disease_type),
                (Task::StageSubtype, stage_subtype),
                (Task::LineOfTherapy, line_of_therapy),
                (Task::Biomarker, biomarker),
            ]
            .into_iter()
            .map(|(task, values)| (task, label_cell(&values)))
            .collect();

            let path = paths.feedback_csv();
            match submit_feedback(&path, &text, &candidate)
                .with_context(|| format!("saving feedback to {}", path.display()))?
            {
                Submission::Accepted => println!("Feedback saved."),
                Submission::Duplicate => println!("This feedback already exists."),
            }
        }

        Commands::Retrain => {
            ensure_layout(&paths).context("preparing data directory")?;
            let (labelers, summary) = retrain::retrain(&paths, cli.threshold)?;
            retrain::write_run_summary(&paths, &summary)?;

            println!(
                "Retrained {} of {} labelers on {} rows ({} feedback, {} dropped) in {:.2}s",
                labelers.loaded(),
                labelers.len(),
                summary.rows,
                summary.feedback_rows,
                summary.dropped,
                summary.elapsed_secs
            );
            println!("Summary written to {}", paths.run_summary().display());
        }
    }

    Ok(())
}

/// Join flag values into one stored cell, sorted and `; `-separated.
fn label_cell(values: &[String]) -> String {
    let items: Vec<String> = values.iter().flat_map(|v| split_multilabel(v)).collect();
    join_multilabel(&items)
}

/// Load the keyword mapping table; any failure leaves the rule engine off.
fn load_keyword_table(path: &Path) -> Option<KeywordTable> {
    if !path.exists() {
        warn!(path = %path.display(), "keyword table not found, rule engine disabled");
        return None;
    }
    let table = read_csv_batches(path)
        .map_err(anyhow::Error::from)
        .and_then(|batches| KeywordTable::from_batches(&batches));

    match table {
        Ok(table) => {
            info!(path = %path.display(), rules = table.len(), "loaded keyword table");
            Some(table)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "keyword table unreadable, rule engine disabled");
            None
        }
    }
}
