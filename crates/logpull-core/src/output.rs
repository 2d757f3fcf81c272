//! File output for downloaded logs.
//!
//! The Logs APIs deliver CSV exports as tab-separated text; they are re-encoded
//! as comma-separated CSV before hitting the disk. JSON exports are written as
//! compact JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::LogsApiError;
use crate::RequestId;

/// Parse tab-separated UTF-8 content into rows. Rows may differ in length.
///
/// Blank lines carry no fields and produce no row, so the CSV written from
/// these rows has no empty records.
pub fn tsv_to_rows(content: &[u8]) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(content);

    reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_owned).collect()))
        .collect()
}

/// Write rows as comma-separated CSV with CRLF record terminators.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<(), LogsApiError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?;

    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "data saved");
    Ok(())
}

/// Re-encode tab-separated content as CSV at `path`.
pub fn write_tsv_as_csv(path: &Path, content: &[u8]) -> Result<(), LogsApiError> {
    let rows = tsv_to_rows(content)?;
    write_csv(path, &rows)
}

pub fn write_json(path: &Path, value: &Value) -> Result<(), LogsApiError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;

    info!(path = %path.display(), "data saved");
    Ok(())
}

/// `{source}_{date_since}_{date_until}.{extension}`; missing dates render empty.
pub fn export_file_name(
    source: &str,
    date_since: Option<&str>,
    date_until: Option<&str>,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        source,
        date_since.unwrap_or_default(),
        date_until.unwrap_or_default(),
        extension
    )
}

/// `{request_id}-{part_number}.csv`
pub fn part_file_name(request_id: &RequestId, part_number: u32) -> String {
    format!("{request_id}-{part_number}.csv")
}
