//! CSV ingestion: bytes in, `RawRecord` out.
//!
//! The whole file parses or the call fails; there is no partial result.

use thiserror::Error;

use crate::domain::{RawRecord, RawRow};

/// Required date column (case-sensitive).
pub const DATE_COLUMN: &str = "Date";
/// Required closing-price column (case-sensitive).
pub const CLOSE_COLUMN: &str = "Close";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file is empty")]
    Empty,

    #[error("malformed CSV{}: {reason}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Parse { line: Option<u64>, reason: String },

    #[error("missing columns: {}. Ensure the CSV contains 'Date' and 'Close'", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

impl IngestError {
    fn from_csv(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        let reason = match err.kind() {
            csv::ErrorKind::Utf8 { .. } => "file is not valid UTF-8 text".to_string(),
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => format!("expected {expected_len} fields, found {len}"),
            _ => err.to_string(),
        };
        IngestError::Parse { line, reason }
    }
}

/// Parse an uploaded CSV into a `RawRecord`.
///
/// Requires a header row containing `Date` and `Close`. Other columns are
/// ignored. Rows must all have the header's field count.
pub fn ingest_csv(bytes: &[u8]) -> Result<RawRecord, IngestError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IngestError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers = reader.headers().map_err(IngestError::from_csv)?.clone();
    let columns: Vec<String> = headers.iter().map(String::from).collect();

    let date_idx = columns.iter().position(|c| c == DATE_COLUMN);
    let close_idx = columns.iter().position(|c| c == CLOSE_COLUMN);
    let (date_idx, close_idx) = match (date_idx, close_idx) {
        (Some(d), Some(c)) => (d, c),
        (d, c) => {
            let mut missing = Vec::new();
            if d.is_none() {
                missing.push(DATE_COLUMN.to_string());
            }
            if c.is_none() {
                missing.push(CLOSE_COLUMN.to_string());
            }
            return Err(IngestError::MissingColumns { missing });
        }
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(IngestError::from_csv)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(RawRow {
            line,
            date: record.get(date_idx).unwrap_or_default().to_string(),
            close: record.get(close_idx).unwrap_or_default().to_string(),
        });
    }

    tracing::debug!(rows = rows.len(), columns = columns.len(), "ingested CSV");
    Ok(RawRecord { columns, rows })
}
