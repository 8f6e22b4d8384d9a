//! User actions: upload, forecast, download and the settings between them.
//!
//! Every action runs to completion on the UI thread. Failures land in the
//! status bar and error history; state downstream of a failed step is
//! discarded so the screen never shows results from older input.

use std::path::{Path, PathBuf};

use stockcast_core::{compute_all, standard_indicators};
use stockcast_runner::config::{MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};
use stockcast_runner::{
    download, export_series_csv, export_summary_json, run_forecast as run_pipeline, sample_csv,
    upload, write_export, ForecastRun, PipelineError, SampleOptions,
};

use crate::app::{AppState, ErrorCategory, LoadedData, Panel};

pub const HORIZON_STEP: i64 = 5;
pub const HORIZON_BIG_STEP: i64 = 30;

const SAMPLE_FILE_NAME: &str = "sample.csv";

fn report_pipeline_error(app: &mut AppState, err: &PipelineError, context: String) {
    let kind = err.kind();
    app.push_error(kind.into(), format!("{}: {err}", kind.label()), context);
}

/// Read a CSV from disk and make it the current dataset.
pub fn open_file(app: &mut AppState, path: &Path) {
    match std::fs::read(path) {
        Ok(bytes) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            load_bytes(app, &name, &bytes, Some(path.to_path_buf()));
        }
        Err(e) => {
            app.data = None;
            app.run = None;
            app.push_error(
                ErrorCategory::Input,
                format!("Cannot read file: {e}"),
                path.display().to_string(),
            );
        }
    }
}

/// Load the generated sample dataset.
pub fn load_sample(app: &mut AppState) {
    match sample_csv(&SampleOptions::default()) {
        Ok(bytes) => load_bytes(app, SAMPLE_FILE_NAME, &bytes, None),
        Err(e) => app.push_error(
            ErrorCategory::Other,
            format!("Sample generation failed: {e}"),
            SAMPLE_FILE_NAME.to_string(),
        ),
    }
}

/// Upload step. A new upload always drops the previous forecast.
pub fn load_bytes(app: &mut AppState, name: &str, bytes: &[u8], source: Option<PathBuf>) {
    app.run = None;
    app.preview_scroll = 0;

    let up = match upload(name, bytes) {
        Ok(up) => up,
        Err(e) => {
            app.data = None;
            report_pipeline_error(app, &e, name.to_string());
            return;
        }
    };

    let indicators = compute_all(&up.series, &standard_indicators());
    let warnings = up.report.warnings();
    let message = format!(
        "Loaded {name}: {} rows kept, {} dropped",
        up.report.kept_rows,
        up.report.dropped_rows()
    );
    if source.is_some() {
        app.last_file.clone_from(&source);
    }
    app.data = Some(LoadedData {
        upload: up,
        source,
        indicators,
    });

    if warnings.is_empty() {
        app.set_status(message);
    } else {
        app.set_warning(format!("{message} ({})", warnings.join("; ")));
    }
}

/// Fit the selected model on the loaded series and build the chart.
pub fn run_forecast(app: &mut AppState) {
    let Some(data) = app.data.as_ref() else {
        app.set_warning("Nothing to forecast: press o to open a CSV or g for sample data");
        return;
    };

    let model = app.config.build(app.model);
    let result = run_pipeline(&data.upload.series, model.as_ref(), app.horizon_days).map(|run| {
        let chart = data
            .indicators
            .iter()
            .filter(|col| col.is_price_scale())
            .fold(run.chart, |chart, col| chart.with_overlay(&col.name, &col.values));
        ForecastRun { chart, ..run }
    });
    let context = data.upload.file_name.clone();

    match result {
        Ok(run) => {
            app.set_status(format!(
                "Forecast ready: {} model, {} days ahead, {} rows",
                run.summary.model,
                run.summary.horizon_days,
                run.forecast.len()
            ));
            app.run = Some(run);
            app.active_panel = Panel::Forecast;
        }
        Err(e) => {
            app.run = None;
            report_pipeline_error(app, &e, context);
        }
    }
}

/// Move the horizon by `delta` days within the interactive range.
pub fn adjust_horizon(app: &mut AppState, delta: i64) {
    let next = (i64::from(app.horizon_days) + delta)
        .clamp(i64::from(MIN_HORIZON_DAYS), i64::from(MAX_HORIZON_DAYS));
    app.horizon_days = u32::try_from(next).unwrap_or(MIN_HORIZON_DAYS);
    if app.run_is_stale() {
        app.set_status(format!("Horizon: {} days (Enter to rerun)", app.horizon_days));
    } else {
        app.set_status(format!("Horizon: {} days", app.horizon_days));
    }
}

pub fn cycle_model(app: &mut AppState) {
    app.model = app.model.next();
    app.set_status(format!("Model: {}", app.model));
}

pub fn toggle_indicators(app: &mut AppState) {
    app.show_indicators = !app.show_indicators;
    let state = if app.show_indicators { "on" } else { "off" };
    app.set_status(format!("Indicator overlay {state}"));
}

pub fn set_export_path(app: &mut AppState, input: &str) {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        app.set_warning("Export path unchanged: empty input");
        return;
    }
    app.export_path = PathBuf::from(trimmed);
    app.set_status(format!("Export path: {trimmed}"));
}

/// Side exports sit next to the forecast file as `{stem}{suffix}`.
fn sibling_path(export_path: &Path, suffix: &str) -> PathBuf {
    let stem = export_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "forecast".to_string());
    export_path.with_file_name(format!("{stem}{suffix}"))
}

pub fn series_export_path(export_path: &Path) -> PathBuf {
    sibling_path(export_path, "_series.csv")
}

pub fn summary_export_path(export_path: &Path) -> PathBuf {
    sibling_path(export_path, "_summary.json")
}

fn write_forecast_file(run: &ForecastRun, path: &Path) -> Result<usize, PipelineError> {
    let bytes = download(&run.forecast)?;
    write_export(path, &bytes)?;
    Ok(bytes.len())
}

/// Download step: write the forecast CSV to the export path.
pub fn write_forecast(app: &mut AppState) {
    let Some(run) = app.run.as_ref() else {
        app.set_warning("Nothing to download: run a forecast first");
        return;
    };
    let path = app.export_path.clone();
    match write_forecast_file(run, &path) {
        Ok(len) => app.set_status(format!("Wrote {} ({len} bytes)", path.display())),
        Err(e) => report_pipeline_error(app, &e, path.display().to_string()),
    }
}

/// Write the cleaned series with indicator columns.
pub fn write_series(app: &mut AppState) {
    let Some(data) = app.data.as_ref() else {
        app.set_warning("Nothing to export: load data first");
        return;
    };
    let path = series_export_path(&app.export_path);
    let result = export_series_csv(&data.upload.series, &data.indicators)
        .and_then(|bytes| write_export(&path, &bytes).map(|()| bytes.len()));
    match result {
        Ok(len) => app.set_status(format!("Wrote {} ({len} bytes)", path.display())),
        Err(e) => report_pipeline_error(app, &PipelineError::from(e), path.display().to_string()),
    }
}

/// Write the JSON run summary.
pub fn write_summary(app: &mut AppState) {
    let Some(run) = app.run.as_ref() else {
        app.set_warning("Nothing to summarize: run a forecast first");
        return;
    };
    let path = summary_export_path(&app.export_path);
    let result = export_summary_json(&run.summary)
        .and_then(|json| write_export(&path, json.as_bytes()).map(|()| json.len()));
    match result {
        Ok(len) => app.set_status(format!("Wrote {} ({len} bytes)", path.display())),
        Err(e) => report_pipeline_error(app, &PipelineError::from(e), path.display().to_string()),
    }
}
