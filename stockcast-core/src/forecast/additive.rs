//! Additive trend + seasonality model.
//!
//! y(t) = trend(t) + Σ seasonal(t) + ε
//!
//! - Time is scaled to [0, 1] over the history, prices by max |y|.
//! - Trend is piecewise linear: intercept + slope·t + Σ δⱼ·max(0, t − cⱼ),
//!   with changepoints spread over the first `changepoint_range` of history.
//! - Seasonality is a Fourier series per period (yearly, weekly, daily).
//! - Coefficients come from ridge-penalised least squares; the changepoint
//!   penalty keeps the trend from chasing noise.
//! - Intervals are `z·σ` on history and widen as `sqrt(1 + h/span)` past the
//!   last observation, σ being the residual standard deviation.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::linalg::{normal_equations, solve_spd};
use super::{
    ensure_sufficient, finish, future_dates, interval_z, ForecastError, Forecaster,
    DEFAULT_INTERVAL_WIDTH, DEFAULT_MIN_OBSERVATIONS, MIN_OBSERVATIONS_FLOOR,
};
use crate::domain::{days_between, CleanSeries, Forecast, ForecastRow};

const YEARLY_PERIOD: f64 = 365.25;
const WEEKLY_PERIOD: f64 = 7.0;
const DAILY_PERIOD: f64 = 1.0;

/// Keeps intercept and slope solvable on degenerate inputs.
const TREND_JITTER: f64 = 1e-10;

/// Whether a seasonal component is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Fitted when the history is long and dense enough to resolve it.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

/// One Fourier component: mode plus number of sin/cos pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    #[serde(default)]
    pub mode: SeasonalityMode,
    pub order: usize,
}

impl Seasonality {
    pub const fn auto(order: usize) -> Self {
        Self {
            mode: SeasonalityMode::Auto,
            order,
        }
    }
}

/// Tunables for `AdditiveModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveSettings {
    /// Upper bound on trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of history (by observation count) that may hold changepoints.
    pub changepoint_range: f64,
    /// Ridge weight on changepoint deltas. Larger means a stiffer trend.
    pub changepoint_penalty: f64,
    /// Ridge weight on Fourier coefficients.
    pub seasonality_penalty: f64,
    pub yearly: Seasonality,
    pub weekly: Seasonality,
    pub daily: Seasonality,
}

impl Default for AdditiveSettings {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_penalty: 1.0,
            seasonality_penalty: 0.01,
            yearly: Seasonality::auto(10),
            weekly: Seasonality::auto(3),
            daily: Seasonality::auto(4),
        }
    }
}

/// Resolved seasonal term for one fit.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveSeasonality {
    period: f64,
    order: usize,
}

/// The design of one fit: everything needed to build a feature row for any date.
#[derive(Debug, Clone)]
struct Design {
    span: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<ActiveSeasonality>,
}

impl Design {
    fn n_features(&self) -> usize {
        2 + self.changepoints.len() + self.seasonalities.iter().map(|s| 2 * s.order).sum::<usize>()
    }

    /// Feature row for a point `days` after the first observation.
    fn row(&self, days: f64) -> Array1<f64> {
        let t = days / self.span;
        let mut row = Vec::with_capacity(self.n_features());
        row.push(1.0);
        row.push(t);
        for &c in &self.changepoints {
            row.push((t - c).max(0.0));
        }
        for s in &self.seasonalities {
            for k in 1..=s.order {
                let angle = 2.0 * PI * k as f64 * days / s.period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        Array1::from(row)
    }

    /// One feature row per entry of `days`.
    fn matrix(&self, days: &[f64]) -> Array2<f64> {
        let mut x = Array2::zeros((days.len(), self.n_features()));
        for (mut out, &d) in x.rows_mut().into_iter().zip(days) {
            out.assign(&self.row(d));
        }
        x
    }

    /// Diagonal ridge weights aligned with `row`.
    fn penalties(&self, settings: &AdditiveSettings) -> Vec<f64> {
        let mut p = vec![TREND_JITTER, TREND_JITTER];
        p.extend(std::iter::repeat(settings.changepoint_penalty).take(self.changepoints.len()));
        let seasonal = self.n_features() - p.len();
        p.extend(std::iter::repeat(settings.seasonality_penalty).take(seasonal));
        p
    }
}

/// Piecewise-linear trend plus Fourier seasonality, fitted by ridge regression.
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    settings: AdditiveSettings,
    interval_width: f64,
    min_observations: usize,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self::new(AdditiveSettings::default())
    }
}

impl AdditiveModel {
    pub fn new(settings: AdditiveSettings) -> Self {
        Self {
            settings,
            interval_width: DEFAULT_INTERVAL_WIDTH,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }

    pub fn with_interval_width(mut self, width: f64) -> Self {
        self.interval_width = width;
        self
    }

    pub fn with_min_observations(mut self, n: usize) -> Self {
        self.min_observations = n.max(MIN_OBSERVATIONS_FLOOR);
        self
    }

    pub fn settings(&self) -> &AdditiveSettings {
        &self.settings
    }

    fn changepoints(&self, t: &[f64]) -> Vec<f64> {
        let n = t.len();
        let range = self.settings.changepoint_range.clamp(0.0, 1.0);
        let hist_size = (range * n as f64).floor() as usize;
        let count = self.settings.n_changepoints.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }
        let last_idx = (hist_size - 1) as f64;
        let mut cps: Vec<f64> = (1..=count)
            .map(|j| {
                let idx = (j as f64 * last_idx / count as f64).round() as usize;
                t[idx.min(n - 1)]
            })
            .collect();
        cps.dedup();
        cps
    }

    fn seasonalities(&self, series: &CleanSeries) -> Vec<ActiveSeasonality> {
        let span = series.span_days();
        let spacing = series.min_spacing_days().unwrap_or(f64::INFINITY);
        let candidates = [
            (self.settings.yearly, YEARLY_PERIOD, span >= 730.0),
            (self.settings.weekly, WEEKLY_PERIOD, span >= 14.0 && spacing < 7.0),
            (self.settings.daily, DAILY_PERIOD, span >= 2.0 && spacing < 1.0),
        ];
        candidates
            .into_iter()
            .filter(|(s, _, auto_on)| {
                s.order > 0
                    && match s.mode {
                        SeasonalityMode::Auto => *auto_on,
                        SeasonalityMode::Enabled => true,
                        SeasonalityMode::Disabled => false,
                    }
            })
            .map(|(s, period, _)| ActiveSeasonality {
                period,
                order: s.order,
            })
            .collect()
    }
}

impl Forecaster for AdditiveModel {
    fn name(&self) -> &str {
        "additive"
    }

    fn min_observations(&self) -> usize {
        self.min_observations
    }

    fn fit(&self, series: &CleanSeries, horizon_days: u32) -> Result<Forecast, ForecastError> {
        ensure_sufficient(series, self.min_observations)?;
        let z = interval_z(self.interval_width)?;

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

        let days: Vec<f64> = series
            .points()
            .iter()
            .map(|o| days_between(first.ds, o.ds))
            .collect();
        let t: Vec<f64> = days.iter().map(|d| d / span).collect();

        let y_scale = series
            .points()
            .iter()
            .map(|o| o.y.abs())
            .fold(0.0, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let y: Array1<f64> = series.points().iter().map(|o| o.y / y_scale).collect();

        let design = Design {
            span,
            changepoints: self.changepoints(&t),
            seasonalities: self.seasonalities(series),
        };

        let x = design.matrix(&days);
        let (mut xtx, xty) = normal_equations(&x, &y);
        for (i, lambda) in design.penalties(&self.settings).into_iter().enumerate() {
            xtx[[i, i]] += lambda;
        }
        let beta = solve_spd(&xtx, &xty).ok_or_else(|| {
            ForecastError::Failure("normal equations are not positive definite".into())
        })?;

        let fitted = x.dot(&beta);
        let ssr: f64 = (&y - &fitted).mapv(|r| r * r).sum();
        let dof = series.len().saturating_sub(2).max(1) as f64;
        let sigma = (ssr / dof).sqrt() * y_scale;

        tracing::debug!(
            n = series.len(),
            changepoints = design.changepoints.len(),
            seasonal_terms = design.seasonalities.len(),
            sigma,
            "additive model fitted"
        );

        let mut out = Vec::with_capacity(series.len() + horizon_days as usize);
        for (obs, f) in series.points().iter().zip(&fitted) {
            out.push(ForecastRow::symmetric(obs.ds, f * y_scale, z * sigma));
        }
        for ds in future_dates(last.ds, horizon_days)? {
            let d = days_between(first.ds, ds);
            let h = d - span;
            let yhat = design.row(d).dot(&beta) * y_scale;
            let half = z * sigma * (1.0 + h / span).sqrt();
            out.push(ForecastRow::symmetric(ds, yhat, half));
        }

        finish(self.name(), horizon_days, series.len(), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::test_support::{daily, linear};
    use chrono::Duration;

    #[test]
    fn recovers_a_straight_line() {
        let series = linear(60, 100.0, 0.5);
        let model = AdditiveModel::default();
        let forecast = model.fit(&series, 30).unwrap();
        let last = forecast.last().unwrap();
        // 59 observed steps + 30 future days at 0.5/day
        let expected = 100.0 + 0.5 * 89.0;
        assert!(
            (last.point_estimate - expected).abs() < 1.0,
            "got {}, expected ~{expected}",
            last.point_estimate
        );
    }

    #[test]
    fn output_covers_history_then_horizon() {
        let series = linear(30, 10.0, 1.0);
        let forecast = AdditiveModel::default().fit(&series, 365).unwrap();
        assert_eq!(forecast.len(), 30 + 365);
        assert_eq!(forecast.history_len, 30);
        let last_obs = series.last().unwrap().ds;
        assert_eq!(forecast.last().unwrap().ds, last_obs + Duration::days(365));
        for pair in forecast.future_rows().windows(2) {
            assert_eq!(pair[1].ds - pair[0].ds, Duration::days(1));
        }
    }

    #[test]
    fn intervals_bracket_and_widen() {
        let values: Vec<f64> = (0..40)
            .map(|i| 100.0 + i as f64 + if i % 2 == 0 { 2.0 } else { -2.0 })
            .collect();
        let forecast = AdditiveModel::default().fit(&daily(&values), 60).unwrap();
        assert!(forecast.rows.iter().all(ForecastRow::is_ordered));
        let future = forecast.future_rows();
        let first_width = future[0].upper_bound - future[0].lower_bound;
        let last_width = future[59].upper_bound - future[59].lower_bound;
        assert!(last_width > first_width);
    }

    #[test]
    fn too_few_observations() {
        let err = AdditiveModel::default().fit(&linear(2, 1.0, 1.0), 30).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { required: 10, actual: 2 }
        ));
    }

    #[test]
    fn constant_series_forecasts_flat() {
        let forecast = AdditiveModel::default().fit(&linear(20, 50.0, 0.0), 10).unwrap();
        for row in &forecast.rows {
            assert!((row.point_estimate - 50.0).abs() < 1e-3);
        }
    }

    #[test]
    fn weekly_auto_needs_two_weeks_of_dense_data() {
        let model = AdditiveModel::default();
        let short = linear(10, 1.0, 1.0);
        assert!(model.seasonalities(&short).is_empty());
        let long = linear(30, 1.0, 1.0);
        let active = model.seasonalities(&long);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].period, WEEKLY_PERIOD);
    }

    #[test]
    fn disabled_seasonality_is_skipped() {
        let settings = AdditiveSettings {
            weekly: Seasonality {
                mode: SeasonalityMode::Disabled,
                order: 3,
            },
            ..Default::default()
        };
        let model = AdditiveModel::new(settings);
        assert!(model.seasonalities(&linear(30, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn changepoints_stay_in_first_part_of_history() {
        let t: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let cps = AdditiveModel::default().changepoints(&t);
        assert_eq!(cps.len(), 25);
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8));
    }

    #[test]
    fn bad_interval_width_is_failure() {
        let model = AdditiveModel::default().with_interval_width(1.5);
        assert!(matches!(
            model.fit(&linear(20, 1.0, 1.0), 5),
            Err(ForecastError::Failure(_))
        ));
    }
}
