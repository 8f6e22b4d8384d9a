//! Raw and cleaned price series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Text format used when a clean series is rendered back into raw rows.
///
/// Sub-second parts are written only when present.
pub const RAW_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One data row of an uploaded file, still as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// 1-based line in the source file (header is line 1).
    pub line: u64,
    pub date: String,
    /// Empty when the cell was blank.
    pub close: String,
}

/// The ingested file: header names plus the two required columns per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawRecord {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<&CleanSeries> for RawRecord {
    /// Render a clean series back into raw text rows.
    ///
    /// Prices use Rust's shortest round-trip formatting, so re-parsing yields
    /// bit-identical values.
    fn from(series: &CleanSeries) -> Self {
        let rows = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, obs)| RawRow {
                line: i as u64 + 2,
                date: obs.ds.format(RAW_DATETIME_FORMAT).to_string(),
                close: obs.y.to_string(),
            })
            .collect();
        Self {
            columns: vec!["Date".into(), "Close".into()],
            rows,
        }
    }
}

/// A single cleaned observation: timezone-naive timestamp and closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ds: NaiveDateTime,
    pub y: f64,
}

/// Violations of the clean-series invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("date {current} at position {index} does not come after {previous}")]
    NotStrictlyIncreasing {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("price at {ds} is not a finite number")]
    NonFinitePrice { ds: NaiveDateTime },
}

/// Ordered, deduplicated, gap-tolerant price series.
///
/// Invariants: dates strictly increasing, every price finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanSeries {
    points: Vec<Observation>,
}

impl CleanSeries {
    /// Build a series, validating ordering and finiteness.
    pub fn new(points: Vec<Observation>) -> Result<Self, SeriesError> {
        for (i, obs) in points.iter().enumerate() {
            if !obs.y.is_finite() {
                return Err(SeriesError::NonFinitePrice { ds: obs.ds });
            }
            if i > 0 && points[i - 1].ds >= obs.ds {
                return Err(SeriesError::NotStrictlyIncreasing {
                    index: i,
                    previous: points[i - 1].ds,
                    current: obs.ds,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }

    pub fn dates(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|o| o.ds).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|o| o.y).collect()
    }

    /// First `n` observations (the "raw data preview").
    pub fn head(&self, n: usize) -> &[Observation] {
        &self.points[..n.min(self.points.len())]
    }

    /// Calendar span between first and last observation, in fractional days.
    pub fn span_days(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(a), Some(b)) => days_between(a.ds, b.ds),
            _ => 0.0,
        }
    }

    /// Smallest gap between consecutive observations, in fractional days.
    pub fn min_spacing_days(&self) -> Option<f64> {
        self.points
            .windows(2)
            .map(|w| days_between(w[0].ds, w[1].ds))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Minimum and maximum closing price.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let lo = self.points.iter().map(|o| o.y).fold(f64::INFINITY, f64::min);
        let hi = self
            .points
            .iter()
            .map(|o| o.y)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

/// Signed distance `to - from` in fractional days.
///
/// Nanosecond resolution, so distinct timestamps never come out zero apart.
/// Spans past ~292 years fall back to milliseconds.
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to.signed_duration_since(from);
    match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / 86_400e9,
        None => delta.num_milliseconds() as f64 / 86_400_000.0,
    }
}
