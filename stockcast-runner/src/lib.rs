//! Stockcast Runner: pipeline actions, chart model, export, configuration.
//!
//! This crate builds on `stockcast-core` to provide:
//! - The three user actions: `upload`, `run_forecast`, `download`
//! - A `ForecastChart` plot object for the shell to draw
//! - Forecast CSV, series CSV and summary JSON export
//! - TOML forecast configuration and model selection
//! - Deterministic synthetic sample data

pub mod chart;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod sample;

pub use chart::{render_chart, BandPoint, ForecastChart, LineSeries};
pub use config::{clamp_horizon, ConfigError, ForecastConfig, ModelKind};
pub use export::{
    export_forecast_csv, export_series_csv, export_summary_json, write_export, ExportError,
    DEFAULT_EXPORT_FILE,
};
pub use pipeline::{
    dataset_hash, download, run_forecast, upload, ErrorKind, ForecastRun, PipelineError,
    RunSummary, Upload, SCHEMA_VERSION,
};
pub use sample::{generate_sample_bars, sample_csv, sample_series, SampleBar, SampleOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn pipeline_state_is_send_sync() {
        assert_send::<Upload>();
        assert_sync::<Upload>();
        assert_send::<ForecastRun>();
        assert_sync::<ForecastRun>();
    }

    #[test]
    fn config_and_errors_are_send_sync() {
        assert_send::<ForecastConfig>();
        assert_sync::<ForecastConfig>();
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }
}
