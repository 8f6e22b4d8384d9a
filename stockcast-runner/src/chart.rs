//! Chart model: an in-memory plot object, no rendering.
//!
//! x is fractional days since the first observation; labels map x back to dates.
//! The shell draws whatever is here and nothing else.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use stockcast_core::domain::days_between;
use stockcast_core::{CleanSeries, Forecast};

pub const CHART_TITLE: &str = "Stock Price Forecast";
pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Stock Price";
pub const ACTUAL_NAME: &str = "Actual";
pub const PREDICTED_NAME: &str = "Predicted";

const X_LABEL_COUNT: usize = 5;
const PAD_FRACTION: f64 = 0.05;

/// A named polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// One vertical slice of the confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub x: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Date at x = 0.
    pub origin: NaiveDateTime,
    pub actual: LineSeries,
    pub predicted: LineSeries,
    pub band: Vec<BandPoint>,
    /// Indicator lines on the price scale, aligned with `actual`.
    pub overlays: Vec<LineSeries>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Evenly spaced date labels across `x_bounds`.
    pub x_labels: Vec<String>,
    /// x of the first future row, if any.
    pub forecast_start: Option<f64>,
}

/// Build the plot object for a series and its forecast.
pub fn render_chart(series: &CleanSeries, forecast: &Forecast) -> ForecastChart {
    let origin = series
        .first()
        .map(|o| o.ds)
        .or_else(|| forecast.rows.first().map(|r| r.ds))
        .unwrap_or_default();

    let actual = LineSeries {
        name: ACTUAL_NAME.to_string(),
        points: series
            .points()
            .iter()
            .map(|o| (days_between(origin, o.ds), o.y))
            .collect(),
    };
    let predicted = LineSeries {
        name: PREDICTED_NAME.to_string(),
        points: forecast
            .rows
            .iter()
            .map(|r| (days_between(origin, r.ds), r.point_estimate))
            .collect(),
    };
    let band = forecast
        .rows
        .iter()
        .map(|r| BandPoint {
            x: days_between(origin, r.ds),
            lower: r.lower_bound,
            upper: r.upper_bound,
        })
        .collect();
    let forecast_start = forecast
        .future_rows()
        .first()
        .map(|r| days_between(origin, r.ds));

    let mut chart = ForecastChart {
        title: CHART_TITLE.to_string(),
        x_label: X_AXIS_LABEL.to_string(),
        y_label: Y_AXIS_LABEL.to_string(),
        origin,
        actual,
        predicted,
        band,
        overlays: Vec::new(),
        x_bounds: [0.0, 1.0],
        y_bounds: [0.0, 1.0],
        x_labels: Vec::new(),
        forecast_start,
    };
    chart.recompute_bounds();
    chart
}

impl ForecastChart {
    /// Add an indicator line. `values` align with the observed dates; `NaN`
    /// entries (warmup) are skipped.
    pub fn with_overlay(mut self, name: impl Into<String>, values: &[f64]) -> Self {
        let points = self
            .actual
            .points
            .iter()
            .zip(values)
            .filter(|(_, v)| v.is_finite())
            .map(|(&(x, _), &v)| (x, v))
            .collect();
        self.overlays.push(LineSeries {
            name: name.into(),
            points,
        });
        self.recompute_bounds();
        self
    }

    /// Date at chart position `x`, rounded to the second.
    pub fn date_at(&self, x: f64) -> NaiveDateTime {
        let secs = (x * 86_400.0).round() as i64;
        self.origin
            .checked_add_signed(Duration::seconds(secs))
            .unwrap_or(self.origin)
    }

    pub fn has_forecast(&self) -> bool {
        !self.predicted.points.is_empty()
    }

    fn recompute_bounds(&mut self) {
        let xs = self
            .actual
            .points
            .iter()
            .chain(&self.predicted.points)
            .map(|p| p.0);
        let (x_min, x_max) = min_max(xs).unwrap_or((0.0, 1.0));
        let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
        self.x_bounds = [x_min, x_max];

        let ys = self
            .actual
            .points
            .iter()
            .chain(&self.predicted.points)
            .chain(self.overlays.iter().flat_map(|o| o.points.iter()))
            .map(|p| p.1)
            .chain(self.band.iter().flat_map(|b| [b.lower, b.upper]));
        let (y_min, y_max) = min_max(ys).unwrap_or((0.0, 1.0));
        let range = y_max - y_min;
        let pad = if range > 0.0 {
            range * PAD_FRACTION
        } else {
            (y_max.abs() * PAD_FRACTION).max(1.0)
        };
        self.y_bounds = [y_min - pad, y_max + pad];

        self.x_labels = (0..X_LABEL_COUNT)
            .map(|i| {
                let x = x_min + (x_max - x_min) * i as f64 / (X_LABEL_COUNT - 1) as f64;
                self.date_at(x).format("%Y-%m-%d").to_string()
            })
            .collect();
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
