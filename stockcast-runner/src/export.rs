//! Export: forecast CSV, cleaned series CSV, run summary JSON.
//!
//! Output is byte-for-byte deterministic: `\n` line endings, fixed column
//! order, and Rust's shortest round-trip float formatting.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};
use thiserror::Error;

use stockcast_core::{CleanSeries, Forecast, IndicatorColumn};

use crate::pipeline::RunSummary;

/// Default file name offered for the forecast download.
pub const DEFAULT_EXPORT_FILE: &str = "forecast.csv";

pub const FORECAST_HEADER: [&str; 4] = ["Date", "point_estimate", "lower_bound", "upper_bound"];

const DATE_ONLY: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("indicator '{name}' has {actual} values for {expected} observations")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![])
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Date-only when every timestamp is midnight, otherwise full date-time.
fn date_format<'a>(dates: impl IntoIterator<Item = &'a NaiveDateTime>) -> &'static str {
    let all_midnight = dates
        .into_iter()
        .all(|d| d.hour() == 0 && d.minute() == 0 && d.second() == 0 && d.nanosecond() == 0);
    if all_midnight {
        DATE_ONLY
    } else {
        DATE_TIME
    }
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        String::new()
    }
}

/// Serialize forecast rows as CSV.
///
/// Columns: Date, point_estimate, lower_bound, upper_bound
pub fn export_forecast_csv(forecast: &Forecast) -> Result<Vec<u8>, ExportError> {
    let mut wtr = writer();
    wtr.write_record(FORECAST_HEADER)?;

    let fmt = date_format(forecast.rows.iter().map(|r| &r.ds));
    for row in &forecast.rows {
        wtr.write_record([
            row.ds.format(fmt).to_string(),
            row.point_estimate.to_string(),
            row.lower_bound.to_string(),
            row.upper_bound.to_string(),
        ])?;
    }

    let bytes = finish(wtr)?;
    tracing::debug!(rows = forecast.len(), bytes = bytes.len(), "exported forecast CSV");
    Ok(bytes)
}

/// Serialize the cleaned series plus indicator columns as CSV.
///
/// Columns: Date, Close, then one per indicator. Warmup cells are empty.
pub fn export_series_csv(
    series: &CleanSeries,
    indicators: &[IndicatorColumn],
) -> Result<Vec<u8>, ExportError> {
    for col in indicators {
        if col.values.len() != series.len() {
            return Err(ExportError::ColumnLength {
                name: col.name.clone(),
                expected: series.len(),
                actual: col.values.len(),
            });
        }
    }

    let mut wtr = writer();
    let mut header = vec!["Date".to_string(), "Close".to_string()];
    header.extend(indicators.iter().map(|c| c.name.clone()));
    wtr.write_record(&header)?;

    let fmt = date_format(series.points().iter().map(|o| &o.ds));
    for (i, obs) in series.points().iter().enumerate() {
        let mut record = vec![obs.ds.format(fmt).to_string(), fmt_value(obs.y)];
        record.extend(indicators.iter().map(|c| fmt_value(c.values[i])));
        wtr.write_record(&record)?;
    }
    finish(wtr)
}

/// Serialize a run summary to pretty JSON.
pub fn export_summary_json(summary: &RunSummary) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Write export bytes to disk, creating parent directories as needed.
pub fn write_export(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(())
}
