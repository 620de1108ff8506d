//! First-run setup of the data directory.

use std::path::Path;
use std::sync::Arc;

use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use tracing::info;
use trialtag_core::Paths;
use trialtag_core::schema::{feedback_schema, training_schema};

use crate::StoreError;
use crate::csv::write_csv_batch;

/// Create the directory tree and header-only tables for any table that does
/// not exist yet. Existing files are never touched.
pub fn ensure_layout(paths: &Paths) -> Result<(), StoreError> {
    let train = paths.train_csv();
    let test = paths.test_csv();
    let dirs = [
        train.parent(),
        test.parent(),
        Some(paths.models_dir.as_path()),
        Some(paths.outputs_dir.as_path()),
    ];
    for dir in dirs.into_iter().flatten() {
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    }

    write_header_if_missing(&train, training_schema())?;
    write_header_if_missing(&test, training_schema())?;
    write_header_if_missing(&paths.feedback_csv(), feedback_schema())?;
    Ok(())
}

fn write_header_if_missing(path: &Path, schema: Schema) -> Result<(), StoreError> {
    if path.exists() {
        return Ok(());
    }
    write_csv_batch(path, &RecordBatch::new_empty(Arc::new(schema)))?;
    info!(path = %path.display(), "created empty table");
    Ok(())
}
