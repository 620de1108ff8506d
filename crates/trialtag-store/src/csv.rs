//! CSV ↔ Arrow for the keyword, training, and feedback tables.
//!
//! Every column is read as nullable `Utf8`; callers treat null and empty
//! cells alike.
//! Files are decoded as UTF-8 first and as Windows-1252 when that fails, so
//! tables saved by spreadsheet tools still load. Writes are always UTF-8.

use std::io::{Cursor, Write};
use std::path::Path;

use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use trialtag_core::schema::all_utf8;

use crate::StoreError;

/// Windows-1252 code points for bytes 0x80..=0x9F. `None` marks bytes the
/// encoding leaves undefined.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Decode file bytes as UTF-8, falling back to Windows-1252.
pub fn decode_text(bytes: Vec<u8>, path: &Path) -> Result<String, StoreError> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "not valid UTF-8, decoding as Windows-1252");
            decode_cp1252(e.as_bytes(), path)
        }
    }
}

fn decode_cp1252(bytes: &[u8], path: &Path) -> Result<String, StoreError> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize].ok_or_else(|| StoreError::Encoding {
                path: path.to_path_buf(),
                byte: b,
            }),
            _ => Ok(char::from(b)),
        })
        .collect()
}

/// Read a CSV file with a header row into all-`Utf8` record batches.
///
/// An empty file yields no batches.
pub fn read_csv_batches(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    let text = decode_text(bytes, path)?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(&text);
    if text.trim().is_empty() {
        return Ok(vec![]);
    }

    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(text.as_bytes()), Some(0))?;
    let schema = all_utf8(&inferred);

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .with_truncated_rows(true)
        .build(Cursor::new(text.as_bytes()))?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;

    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    debug!(path = %path.display(), rows, "read csv table");
    Ok(batches)
}

/// Write one batch as CSV with a header, replacing `path` atomically.
pub fn write_csv_batch(path: &Path, batch: &RecordBatch) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut tmp);
        writer.write(batch)?;
    }
    tmp.flush().map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    debug!(path = %path.display(), rows = batch.num_rows(), "wrote csv table");
    Ok(())
}
