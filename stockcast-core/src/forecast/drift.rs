//! Random walk with drift.
//!
//! Drift per day is the average slope from first to last observation.
//! σ² comes from gap-normalised step residuals, so irregular spacing (weekends,
//! holidays) does not inflate it. A value h days ahead has variance
//! σ²·h·(1 + h/span): the random-walk term plus drift-estimation error.

use super::{
    ensure_sufficient, finish, future_dates, interval_z, ForecastError, Forecaster,
    DEFAULT_INTERVAL_WIDTH, DEFAULT_MIN_OBSERVATIONS, MIN_OBSERVATIONS_FLOOR,
};
use crate::domain::{days_between, CleanSeries, Forecast, ForecastRow};

#[derive(Debug, Clone)]
pub struct DriftModel {
    interval_width: f64,
    min_observations: usize,
}

impl Default for DriftModel {
    fn default() -> Self {
        Self {
            interval_width: DEFAULT_INTERVAL_WIDTH,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

impl DriftModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    pub fn with_min_observations(mut self, n: usize) -> Self {
        self.min_observations = n.max(MIN_OBSERVATIONS_FLOOR);
        self
    }
}

impl Forecaster for DriftModel {
    fn name(&self) -> &str {
        "drift"
    }

    fn min_observations(&self) -> usize {
        self.min_observations
    }

    fn fit(&self, series: &CleanSeries, horizon_days: u32) -> Result<Forecast, ForecastError> {
        ensure_sufficient(series, self.min_observations)?;
        let z = interval_z(self.interval_width)?;

        let points = series.points();
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Err(ForecastError::InsufficientData {
                required: self.min_observations,
                actual: 0,
            });
        };
        let span = series.span_days();
        if span <= 0.0 {
            return Err(ForecastError::Failure("history spans zero time".into()));
        }

        let drift = (last.y - first.y) / span;
        let gaps: Vec<f64> = points
            .windows(2)
            .map(|w| days_between(w[0].ds, w[1].ds))
            .collect();
        let sq: f64 = points
            .windows(2)
            .zip(&gaps)
            .map(|(w, &g)| (w[1].y - w[0].y - drift * g).powi(2) / g)
            .sum();
        let dof = points.len().saturating_sub(2).max(1) as f64;
        let sigma = (sq / dof).sqrt();

        tracing::debug!(n = points.len(), drift, sigma, "drift model fitted");

        let mut rows = Vec::with_capacity(points.len() + horizon_days as usize);
        rows.push(ForecastRow::symmetric(first.ds, first.y, z * sigma));
        for (w, &g) in points.windows(2).zip(&gaps) {
            rows.push(ForecastRow::symmetric(
                w[1].ds,
                w[0].y + drift * g,
                z * sigma * g.sqrt(),
            ));
        }
        for ds in future_dates(last.ds, horizon_days)? {
            let h = days_between(last.ds, ds);
            rows.push(ForecastRow::symmetric(
                ds,
                last.y + drift * h,
                z * sigma * (h * (1.0 + h / span)).sqrt(),
            ));
        }

        finish(self.name(), horizon_days, points.len(), rows)
    }
}
