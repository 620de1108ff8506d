//! Prediction layer: keyword rule engine, pluggable statistical labelers,
//! and the ensemble that merges them.

pub mod centroid;
pub mod ensemble;
pub mod labeler;
pub mod predict;
pub mod rules;

pub use centroid::{CentroidModel, CentroidSummary};
pub use ensemble::merge_predictions;
pub use labeler::{
    BinarizedLabeler, DirectLabeler, IndicatorModel, Labeler, LabelerError, Labelers, TextModel,
};
pub use predict::{Explanations, PredictionOutput, predict};
pub use rules::{KeywordRule, KeywordTable, RuleMatch, match_keywords};
