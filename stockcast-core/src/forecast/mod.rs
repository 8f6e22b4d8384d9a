//! Forecasting capability.
//!
//! A `Forecaster` takes a clean series and a horizon and returns one row per
//! observed date followed by one row per future calendar day. Callers hold a
//! `&dyn Forecaster`; nothing downstream knows which model produced the rows.

pub mod additive;
pub mod drift;
mod linalg;

use chrono::{Duration, NaiveDateTime};
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::domain::{CleanSeries, Forecast, ForecastRow};

pub use additive::{AdditiveModel, AdditiveSettings, Seasonality, SeasonalityMode};
pub use drift::DriftModel;

/// Observations required before any model will fit.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;
/// Models refuse to go below this regardless of configuration.
pub const MIN_OBSERVATIONS_FLOOR: usize = 2;
/// Central probability mass covered by the interval.
pub const DEFAULT_INTERVAL_WIDTH: f64 = 0.8;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("forecast failed: {0}")]
    Failure(String),
}

/// A model that can be fitted to a price series and extrapolated.
pub trait Forecaster: Send + Sync {
    /// Short identifier (e.g. "additive", "drift").
    fn name(&self) -> &str;

    /// Minimum number of observations `fit` accepts.
    fn min_observations(&self) -> usize;

    /// Fit to `series` and produce history rows plus `horizon_days` future rows.
    fn fit(&self, series: &CleanSeries, horizon_days: u32) -> Result<Forecast, ForecastError>;
}

/// Fail fast when the series is shorter than the model's minimum.
pub(crate) fn ensure_sufficient(series: &CleanSeries, required: usize) -> Result<(), ForecastError> {
    let required = required.max(MIN_OBSERVATIONS_FLOOR);
    if series.len() < required {
        return Err(ForecastError::InsufficientData {
            required,
            actual: series.len(),
        });
    }
    Ok(())
}

/// The `horizon_days` calendar days following `last`, one per day.
pub fn future_dates(last: NaiveDateTime, horizon_days: u32) -> Result<Vec<NaiveDateTime>, ForecastError> {
    (1..=i64::from(horizon_days))
        .map(|h| {
            last.checked_add_signed(Duration::days(h)).ok_or_else(|| {
                ForecastError::Failure(format!("date overflow {h} days after {last}"))
            })
        })
        .collect()
}

/// Two-sided standard normal quantile for a central interval of `width`.
pub(crate) fn interval_z(width: f64) -> Result<f64, ForecastError> {
    if !(width > 0.0 && width < 1.0) {
        return Err(ForecastError::Failure(format!(
            "interval width must be between 0 and 1, got {width}"
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::Failure(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

/// Final gate shared by every model: rows finite and intervals ordered.
pub(crate) fn finish(
    model: &str,
    horizon_days: u32,
    history_len: usize,
    rows: Vec<ForecastRow>,
) -> Result<Forecast, ForecastError> {
    if let Some(bad) = rows.iter().find(|r| !r.is_finite() || !r.is_ordered()) {
        return Err(ForecastError::Failure(format!(
            "{model} produced a non-finite or unordered value at {}",
            bad.ds
        )));
    }
    Ok(Forecast {
        model: model.to_string(),
        horizon_days,
        history_len,
        rows,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::daily;
    use super::*;

    #[test]
    fn future_dates_step_one_day() {
        let series = daily(&[1.0, 2.0]);
        let last = series.last().unwrap().ds;
        let dates = future_dates(last, 3).unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0], last + Duration::days(1));
        assert_eq!(dates[2], last + Duration::days(3));
    }

    #[test]
    fn zero_horizon_has_no_future_dates() {
        let series = daily(&[1.0, 2.0]);
        assert!(future_dates(series.last().unwrap().ds, 0).unwrap().is_empty());
    }

    #[test]
    fn z_for_eighty_percent() {
        let z = interval_z(0.8).unwrap();
        assert!((z - 1.281_551_565_5).abs() < 1e-6, "z = {z}");
    }

    #[test]
    fn z_rejects_out_of_range_width() {
        assert!(interval_z(0.0).is_err());
        assert!(interval_z(1.0).is_err());
        assert!(interval_z(f64::NAN).is_err());
    }

    #[test]
    fn ensure_sufficient_never_below_floor() {
        let one = daily(&[1.0]);
        match ensure_sufficient(&one, 0).unwrap_err() {
            ForecastError::InsufficientData { required, actual } => {
                assert_eq!(required, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn finish_rejects_non_finite_rows() {
        let series = daily(&[1.0]);
        let row = ForecastRow::symmetric(series.points()[0].ds, f64::NAN, 1.0);
        assert!(matches!(
            finish("test", 0, 1, vec![row]),
            Err(ForecastError::Failure(_))
        ));
    }
}
