//! Stockcast CLI: forecast, preview, indicators and sample commands.
//!
//! Commands:
//! - `forecast`: clean a price CSV, fit a model, write the forecast CSV
//! - `preview`: show the cleaning report and the first cleaned rows
//! - `indicators`: write the cleaned series with SMA, EMA, RSI, MACD and Bollinger columns
//! - `sample`: write a deterministic synthetic price CSV

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stockcast_core::{compute_all, standard_indicators};
use stockcast_runner::{
    download, export_series_csv, export_summary_json, run_forecast, sample_csv, upload,
    write_export, ForecastConfig, ModelKind, PipelineError, RunSummary, SampleOptions, Upload,
    DEFAULT_EXPORT_FILE,
};

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    about = "Stockcast CLI: stock price forecasting from CSV price history"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Forecast future prices and write them as CSV.
    Forecast {
        /// Input CSV with Date and Close columns.
        #[arg(long)]
        input: PathBuf,

        /// Output forecast CSV.
        #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
        output: PathBuf,

        /// Days to forecast past the last observation. Overrides the config file.
        #[arg(long)]
        horizon: Option<u32>,

        /// Forecasting model: additive or drift. Overrides the config file.
        #[arg(long)]
        model: Option<ModelKind>,

        /// Path to a TOML forecast config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write a JSON run summary to this path.
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Show the cleaning report and the first cleaned rows.
    Preview {
        /// Input CSV with Date and Close columns.
        #[arg(long)]
        input: PathBuf,

        /// Number of rows to show.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Write the cleaned series with indicator columns.
    Indicators {
        /// Input CSV with Date and Close columns.
        #[arg(long)]
        input: PathBuf,

        /// Output CSV.
        #[arg(long)]
        output: PathBuf,
    },
    /// Write synthetic weekday prices for demos.
    Sample {
        /// Output CSV.
        #[arg(long)]
        output: PathBuf,

        /// Symbol; seeds the generator.
        #[arg(long, default_value = "SAMPLE")]
        symbol: String,

        /// First date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Forecast {
            input,
            output,
            horizon,
            model,
            config,
            summary,
        } => run_forecast_cmd(&input, &output, horizon, model, config.as_deref(), summary.as_deref())
            .map(|s| print_summary(&s, &output)),
        Commands::Preview { input, rows } => run_preview(&input, rows),
        Commands::Indicators { input, output } => run_indicators(&input, &output),
        Commands::Sample {
            output,
            symbol,
            start,
            end,
        } => run_sample(&output, symbol, start, end),
    }
}

/// Pipeline errors keep their user-facing kind in the message.
fn describe(err: PipelineError) -> anyhow::Error {
    anyhow!("{}: {err}", err.kind().label())
}

fn load(input: &Path) -> Result<Upload> {
    let bytes =
        std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let up = upload(&name, &bytes).map_err(describe)?;
    for warning in up.report.warnings() {
        tracing::warn!("{warning}");
    }
    Ok(up)
}

fn resolve_config(
    path: Option<&Path>,
    horizon: Option<u32>,
    model: Option<ModelKind>,
) -> Result<ForecastConfig> {
    let mut config = match path {
        Some(p) => ForecastConfig::from_file(p)
            .map_err(|e| anyhow!("ConfigError: {e}"))?,
        None => ForecastConfig::default(),
    };
    if let Some(days) = horizon {
        config.horizon_days = days;
    }
    if let Some(kind) = model {
        config.model = kind;
    }
    config.validate().map_err(|e| anyhow!("ConfigError: {e}"))?;
    Ok(config)
}

fn run_forecast_cmd(
    input: &Path,
    output: &Path,
    horizon: Option<u32>,
    model: Option<ModelKind>,
    config_path: Option<&Path>,
    summary_path: Option<&Path>,
) -> Result<RunSummary> {
    let config = resolve_config(config_path, horizon, model)?;
    let up = load(input)?;

    let forecaster = config.build_forecaster();
    let run = run_forecast(&up.series, forecaster.as_ref(), config.horizon_days)
        .map_err(describe)?;

    let bytes = download(&run.forecast).map_err(describe)?;
    write_export(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    if let Some(path) = summary_path {
        let json = export_summary_json(&run.summary)?;
        write_export(path, json.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(run.summary)
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!();
    println!("=== Forecast ===");
    println!("Model:          {}", summary.model);
    println!("Observations:   {}", summary.observations);
    println!(
        "History:        {} to {}",
        summary.first_date, summary.last_date
    );
    println!("Last close:     {:.2}", summary.last_close);
    println!("Horizon:        {} days", summary.horizon_days);
    println!("Forecast end:   {}", summary.forecast_end);
    println!(
        "Final estimate: {:.2} [{:.2}, {:.2}]",
        summary.final_point_estimate, summary.final_lower_bound, summary.final_upper_bound
    );
    println!("Dataset hash:   {}", summary.dataset_hash);
    println!();
    println!("Forecast written to: {}", output.display());
}

fn run_preview(input: &Path, rows: usize) -> Result<()> {
    let up = load(input)?;
    let report = &up.report;

    println!("File:           {}", up.file_name);
    println!("Columns:        {}", up.columns.join(", "));
    println!(
        "Rows:           {} kept of {} ({} bad date, {} missing price, {} duplicates)",
        report.kept_rows,
        report.total_rows,
        report.dropped_invalid_date,
        report.dropped_missing_price,
        report.duplicates_overwritten
    );
    println!();
    println!("{:<20} {:>12}", "Date", "Close");
    println!("{}", "-".repeat(33));
    for obs in up.preview(rows) {
        println!("{:<20} {:>12.2}", obs.ds.to_string(), obs.y);
    }
    if up.series.len() > rows {
        println!("... {} more", up.series.len() - rows);
    }
    Ok(())
}

fn run_indicators(input: &Path, output: &Path) -> Result<()> {
    let up = load(input)?;
    let columns = compute_all(&up.series, &standard_indicators());
    let bytes = export_series_csv(&up.series, &columns)?;
    write_export(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Wrote {} rows with {} to {}",
        up.series.len(),
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", "),
        output.display()
    );
    Ok(())
}

fn run_sample(
    output: &Path,
    symbol: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let defaults = SampleOptions::default();
    let opts = SampleOptions {
        symbol,
        start: start.unwrap_or(defaults.start),
        end: end.unwrap_or(defaults.end),
        start_price: defaults.start_price,
    };
    if opts.start > opts.end {
        anyhow::bail!("--start {} is after --end {}", opts.start, opts.end);
    }
    let bytes = sample_csv(&opts)?;
    write_export(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "Wrote {} sample ({} to {}) to {}",
        opts.symbol,
        opts.start,
        opts.end,
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stockcast").chain(args.iter().copied())).unwrap()
    }

    fn rising_csv(dir: &Path, days: usize) -> PathBuf {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut out = String::from("Date,Close\n");
        for i in 0..days {
            let date = start + chrono::Duration::days(i as i64);
            out.push_str(&format!("{date},{}\n", 100 + i));
        }
        let path = dir.join("prices.csv");
        std::fs::write(&path, out).unwrap();
        path
    }

    #[test]
    fn forecast_args_parse() {
        let cli = parse(&[
            "forecast", "--input", "a.csv", "--horizon", "90", "--model", "drift",
        ]);
        match cli.command {
            Commands::Forecast {
                input,
                output,
                horizon,
                model,
                ..
            } => {
                assert_eq!(input, PathBuf::from("a.csv"));
                assert_eq!(output, PathBuf::from("forecast.csv"));
                assert_eq!(horizon, Some(90));
                assert_eq!(model, Some(ModelKind::Drift));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_model_is_rejected() {
        let err = Cli::try_parse_from(["stockcast", "forecast", "--input", "a", "--model", "arima"]);
        assert!(err.is_err());
    }

    #[test]
    fn sample_dates_parse() {
        let cli = parse(&["sample", "--output", "s.csv", "--start", "2024-01-01"]);
        match cli.command {
            Commands::Sample { start, end, symbol, .. } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert!(end.is_none());
                assert_eq!(symbol, "SAMPLE");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn forecast_writes_csv_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = rising_csv(dir.path(), 30);
        let output = dir.path().join("out.csv");
        let summary_path = dir.path().join("out.json");

        let summary =
            run_forecast_cmd(&input, &output, Some(30), None, None, Some(&summary_path)).unwrap();
        assert_eq!(summary.observations, 30);
        assert_eq!(summary.horizon_days, 30);

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 1 + 30 + 30);
        assert!(std::fs::read_to_string(&summary_path)
            .unwrap()
            .contains("\"model\": \"additive\""));
    }

    #[test]
    fn zero_horizon_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = rising_csv(dir.path(), 30);
        let err = run_forecast_cmd(&input, &dir.path().join("o.csv"), Some(0), None, None, None)
            .unwrap_err();
        assert!(err.to_string().starts_with("ConfigError"));
    }

    #[test]
    fn too_few_rows_names_the_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let input = rising_csv(dir.path(), 3);
        let err = run_forecast_cmd(&input, &dir.path().join("o.csv"), None, None, None, None)
            .unwrap_err();
        assert!(err.to_string().starts_with("InsufficientDataError"));
        assert!(!dir.path().join("o.csv").exists());
    }

    #[test]
    fn config_file_sets_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = rising_csv(dir.path(), 30);
        let config = dir.path().join("stockcast.toml");
        std::fs::write(&config, "model = \"drift\"\nhorizon_days = 45\n").unwrap();
        let summary =
            run_forecast_cmd(&input, &dir.path().join("o.csv"), None, None, Some(&config), None)
                .unwrap();
        assert_eq!(summary.model, "drift");
        assert_eq!(summary.horizon_days, 45);
    }

    #[test]
    fn indicators_and_sample_commands_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("sample.csv");
        run_sample(
            &sample,
            "TEST".into(),
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 6, 30),
        )
        .unwrap();

        let out = dir.path().join("ind.csv");
        run_indicators(&sample, &out).unwrap();
        let text = std::fs::read_to_string(out).unwrap();
        assert!(text.starts_with(
            "Date,Close,SMA_20,EMA_20,RSI_14,MACD,MACD_Signal,Bollinger_Upper,Bollinger_Lower\n"
        ));
    }

    #[test]
    fn reversed_sample_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_sample(
            &dir.path().join("s.csv"),
            "X".into(),
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 1, 1),
        );
        assert!(err.is_err());
    }
}
