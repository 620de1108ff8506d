//! Storage layer: CSV tables as Arrow batches, the feedback store, and
//! training corpus assembly.

mod error;
pub use error::StoreError;

pub mod corpus;
pub mod csv;
pub mod feedback;
pub mod layout;
mod rows;

pub use corpus::{Corpus, assemble_corpus, load_training_rows};
pub use csv::{decode_text, read_csv_batches, write_csv_batch};
pub use feedback::{Submission, append_feedback, load_feedback, submit_feedback, write_feedback};
pub use layout::ensure_layout;
