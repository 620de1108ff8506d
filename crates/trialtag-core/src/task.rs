//! The fixed set of label categories predicted for every trial description.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One label category. Declaration order is the configured task order, so
/// `BTreeMap<Task, _>` iterates tasks the same way `Task::ALL` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    DiseaseType,
    StageSubtype,
    LineOfTherapy,
    Biomarker,
}

impl Task {
    pub const ALL: [Task; 4] = [
        Task::DiseaseType,
        Task::StageSubtype,
        Task::LineOfTherapy,
        Task::Biomarker,
    ];

    /// Stable column key used in every table.
    pub fn key(&self) -> &'static str {
        match self {
            Self::DiseaseType => "disease_type",
            Self::StageSubtype => "stage_subtype",
            Self::LineOfTherapy => "line_of_therapy",
            Self::Biomarker => "biomarker",
        }
    }

    /// Look up a task by column key. Unknown keys are not tasks.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
