//! Synthetic price data for demos and tests.
//!
//! A weekday-only random walk with a mild upward drift and a yearly cycle,
//! seeded from the symbol so the same symbol always yields the same file.
//! Output uses the usual OHLCV download layout; only `Date` and `Close` are
//! read back.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use stockcast_core::{CleanSeries, Observation, SeriesError};

use crate::export::ExportError;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_price: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            symbol: "SAMPLE".to_string(),
            start: NaiveDate::from_ymd_opt(2021, 1, 4).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2023, 12, 29).unwrap_or_default(),
            start_price: 100.0,
        }
    }
}

/// One generated trading day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Generate bars between `start` and `end` inclusive, skipping weekends.
pub fn generate_sample_bars(opts: &SampleOptions) -> Vec<SampleBar> {
    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(opts.symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = opts.start_price.max(1.0);
    let mut current = opts.start;

    while current <= opts.end {
        if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            current += Duration::days(1);
            continue;
        }

        let season = 0.002 * (2.0 * std::f64::consts::PI * current.ordinal() as f64 / 365.25).sin();
        let daily_return: f64 = 0.0004 + season + rng.gen_range(-0.02..0.02);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.01);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(SampleBar {
            date: current,
            open: round2(open),
            high: round2(high),
            low: round2(low),
            close: round2(close),
            volume,
        });

        price = close;
        current += Duration::days(1);
    }
    bars
}

/// Generated closes as a clean series.
pub fn sample_series(opts: &SampleOptions) -> Result<CleanSeries, SeriesError> {
    CleanSeries::new(
        generate_sample_bars(opts)
            .into_iter()
            .map(|b| Observation {
                ds: b.date.and_hms_opt(0, 0, 0).unwrap_or_default(),
                y: b.close,
            })
            .collect(),
    )
}

/// Generated bars as CSV: Date,Open,High,Low,Close,Volume.
pub fn sample_csv(opts: &SampleOptions) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(["Date", "Open", "High", "Low", "Close", "Volume"])?;
    for b in generate_sample_bars(opts) {
        wtr.write_record([
            b.date.format("%Y-%m-%d").to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ])?;
    }
    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(symbol: &str) -> SampleOptions {
        SampleOptions {
            symbol: symbol.to_string(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            start_price: 100.0,
        }
    }

    #[test]
    fn deterministic_per_symbol() {
        assert_eq!(generate_sample_bars(&opts("AAA")), generate_sample_bars(&opts("AAA")));
        assert_ne!(generate_sample_bars(&opts("AAA")), generate_sample_bars(&opts("BBB")));
    }

    #[test]
    fn weekdays_only_and_bars_are_consistent() {
        let bars = generate_sample_bars(&opts("AAA"));
        assert!(!bars.is_empty());
        for b in &bars {
            assert!(!matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(b.low <= b.open.min(b.close) + 0.01);
            assert!(b.high + 0.01 >= b.open.max(b.close));
            assert!(b.close > 0.0);
        }
    }

    #[test]
    fn csv_has_download_layout() {
        let csv = String::from_utf8(sample_csv(&opts("AAA")).unwrap()).unwrap();
        assert!(csv.starts_with("Date,Open,High,Low,Close,Volume\n2024-01-01,"));
    }

    #[test]
    fn series_is_valid() {
        let series = sample_series(&opts("AAA")).unwrap();
        assert_eq!(series.len(), generate_sample_bars(&opts("AAA")).len());
    }

    #[test]
    fn empty_range_gives_no_bars() {
        let mut o = opts("AAA");
        o.end = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(generate_sample_bars(&o).is_empty());
    }
}
