//! Pipeline actions: upload, run_forecast, download.
//!
//! Each action takes only the prior state it needs and returns new state.
//! A failed action returns an error and leaves nothing behind; the caller
//! decides what previous state to keep.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockcast_core::{
    ingest_csv, preprocess, CleanSeries, Forecast, ForecastError, Forecaster, IngestError,
    Observation, PreprocessError, PreprocessReport,
};

use crate::chart::{render_chart, ForecastChart};
use crate::config::ConfigError;
use crate::export::{export_forecast_csv, ExportError};

/// Current schema version for the JSON run summary.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// The user-facing error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Schema,
    EmptyInput,
    InsufficientData,
    ForecastFailure,
    Export,
    Config,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Parse => "ParseError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::EmptyInput => "EmptyInputError",
            ErrorKind::InsufficientData => "InsufficientDataError",
            ErrorKind::ForecastFailure => "ForecastFailure",
            ErrorKind::Export => "ExportError",
            ErrorKind::Config => "ConfigError",
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Ingest(IngestError::MissingColumns { .. }) => ErrorKind::Schema,
            PipelineError::Ingest(_) => ErrorKind::Parse,
            PipelineError::Preprocess(PreprocessError::EmptyInput { .. }) => ErrorKind::EmptyInput,
            PipelineError::Preprocess(PreprocessError::Invariant(_)) => ErrorKind::Parse,
            PipelineError::Forecast(ForecastError::InsufficientData { .. }) => {
                ErrorKind::InsufficientData
            }
            PipelineError::Forecast(ForecastError::Failure(_)) => ErrorKind::ForecastFailure,
            PipelineError::Export(_) => ErrorKind::Export,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

/// State after a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    /// Header of the uploaded file, extras included.
    pub columns: Vec<String>,
    pub series: CleanSeries,
    pub report: PreprocessReport,
    /// BLAKE3 of the cleaned series (hex).
    pub dataset_hash: String,
}

impl Upload {
    /// The first `n` cleaned rows.
    pub fn preview(&self, n: usize) -> &[Observation] {
        self.series.head(n)
    }
}

/// Stable content hash of a clean series.
///
/// Hashes the exact timestamps and price bits, so any change to the cleaned
/// data changes the hash and nothing else does.
pub fn dataset_hash(series: &CleanSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    for obs in series.points() {
        hasher.update(obs.ds.format("%Y-%m-%dT%H:%M:%S%.f").to_string().as_bytes());
        hasher.update(&obs.y.to_bits().to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Ingest and clean an uploaded file.
pub fn upload(file_name: &str, bytes: &[u8]) -> Result<Upload, PipelineError> {
    let raw = ingest_csv(bytes)?;
    let columns = raw.columns.clone();
    let cleaned = preprocess(&raw)?;
    let dataset_hash = dataset_hash(&cleaned.series);

    tracing::info!(
        file = file_name,
        rows = cleaned.report.total_rows,
        kept = cleaned.report.kept_rows,
        hash = &dataset_hash[..12],
        "upload accepted"
    );
    Ok(Upload {
        file_name: file_name.to_string(),
        columns,
        series: cleaned.series,
        report: cleaned.report,
        dataset_hash,
    })
}

/// Machine-readable summary of one forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub model: String,
    pub horizon_days: u32,
    pub observations: usize,
    pub first_date: String,
    pub last_date: String,
    pub last_close: f64,
    pub forecast_end: String,
    pub final_point_estimate: f64,
    pub final_lower_bound: f64,
    pub final_upper_bound: f64,
    pub dataset_hash: String,
}

impl RunSummary {
    fn build(series: &CleanSeries, forecast: &Forecast) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;
        let end = forecast.last()?;
        Some(Self {
            schema_version: SCHEMA_VERSION,
            model: forecast.model.clone(),
            horizon_days: forecast.horizon_days,
            observations: series.len(),
            first_date: first.ds.to_string(),
            last_date: last.ds.to_string(),
            last_close: last.y,
            forecast_end: end.ds.to_string(),
            final_point_estimate: end.point_estimate,
            final_lower_bound: end.lower_bound,
            final_upper_bound: end.upper_bound,
            dataset_hash: dataset_hash(series),
        })
    }
}

/// Everything one forecast trigger produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRun {
    pub forecast: Forecast,
    pub chart: ForecastChart,
    pub summary: RunSummary,
}

/// Fit `model` and build the chart.
///
/// The model is any `Forecaster`; nothing here depends on which one.
pub fn run_forecast(
    series: &CleanSeries,
    model: &dyn Forecaster,
    horizon_days: u32,
) -> Result<ForecastRun, PipelineError> {
    let forecast = model.fit(series, horizon_days)?;
    let summary = RunSummary::build(series, &forecast).ok_or_else(|| {
        ForecastError::Failure("forecast produced no rows".to_string())
    })?;
    let chart = render_chart(series, &forecast);

    tracing::info!(
        model = model.name(),
        horizon_days,
        rows = forecast.len(),
        "forecast complete"
    );
    Ok(ForecastRun {
        forecast,
        chart,
        summary,
    })
}

/// Serialize a forecast for download.
pub fn download(forecast: &Forecast) -> Result<Vec<u8>, PipelineError> {
    Ok(export_forecast_csv(forecast)?)
}
