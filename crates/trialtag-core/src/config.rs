//! Data directory layout.

use std::path::{Path, PathBuf};

/// Every file and directory the pipeline reads or writes, derived from three
/// roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub outputs_dir: PathBuf,
}

impl Paths {
    /// Layout rooted at `project_root`: `data/`, `models/`, `outputs/`.
    pub fn under(project_root: &Path) -> Self {
        Self {
            data_dir: project_root.join("data"),
            models_dir: project_root.join("models"),
            outputs_dir: project_root.join("outputs"),
        }
    }

    pub fn train_csv(&self) -> PathBuf {
        self.data_dir.join("train").join("clinical_trials_train.csv")
    }

    pub fn test_csv(&self) -> PathBuf {
        self.data_dir.join("test").join("clinical_trials_test.csv")
    }

    pub fn keywords_csv(&self) -> PathBuf {
        self.data_dir.join("keywords_mapping.csv")
    }

    pub fn feedback_csv(&self) -> PathBuf {
        self.data_dir.join("feedback.csv")
    }

    pub fn run_summary(&self) -> PathBuf {
        self.outputs_dir.join("run_summary.txt")
    }
}
