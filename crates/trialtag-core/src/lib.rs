pub mod config;
pub mod feedback;
pub mod normalize;
pub mod prediction;
pub mod record;
pub mod schema;
pub mod task;

pub use config::Paths;
pub use feedback::{FeedbackError, dedup_against_training, feedback_exists, validate_submission};
pub use normalize::{canonical_labels, canonical_text, clean, join_multilabel, split_multilabel};
pub use prediction::{Origin, PredictionSet, Provenance};
pub use record::{FeedbackRecord, LabelledRow, TaskValues, TrainingRow};
pub use task::Task;
