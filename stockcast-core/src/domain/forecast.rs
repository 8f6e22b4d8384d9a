//! Forecast output: one row per date with a point estimate and interval.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single forecast row.
///
/// Invariant: `lower_bound <= point_estimate <= upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDateTime,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastRow {
    /// Build a row from a point estimate and a non-negative half-width.
    pub fn symmetric(ds: NaiveDateTime, point_estimate: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        Self {
            ds,
            point_estimate,
            lower_bound: point_estimate - half_width,
            upper_bound: point_estimate + half_width,
        }
    }

    /// True when the interval brackets the point estimate.
    pub fn is_ordered(&self) -> bool {
        self.lower_bound <= self.point_estimate && self.point_estimate <= self.upper_bound
    }

    pub fn is_finite(&self) -> bool {
        self.point_estimate.is_finite() && self.lower_bound.is_finite() && self.upper_bound.is_finite()
    }
}

/// The complete output of one forecaster run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Name of the capability that produced the rows.
    pub model: String,
    /// Number of future calendar days appended after the last observation.
    pub horizon_days: u32,
    /// Number of leading rows that cover observed dates.
    pub history_len: usize,
    pub rows: Vec<ForecastRow>,
}

impl Forecast {
    pub fn history_rows(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len.min(self.rows.len())]
    }

    pub fn future_rows(&self) -> &[ForecastRow] {
        &self.rows[self.history_len.min(self.rows.len())..]
    }

    pub fn last(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ds(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn symmetric_row_is_ordered() {
        let row = ForecastRow::symmetric(ds(1), 100.0, 5.0);
        assert_eq!(row.lower_bound, 95.0);
        assert_eq!(row.upper_bound, 105.0);
        assert!(row.is_ordered());
    }

    #[test]
    fn negative_half_width_is_folded() {
        let row = ForecastRow::symmetric(ds(1), 100.0, -5.0);
        assert!(row.is_ordered());
        assert_eq!(row.upper_bound - row.lower_bound, 10.0);
    }

    #[test]
    fn history_and_future_split() {
        let forecast = Forecast {
            model: "test".into(),
            horizon_days: 2,
            history_len: 1,
            rows: vec![
                ForecastRow::symmetric(ds(1), 1.0, 0.0),
                ForecastRow::symmetric(ds(2), 2.0, 0.5),
                ForecastRow::symmetric(ds(3), 3.0, 1.0),
            ],
        };
        assert_eq!(forecast.history_rows().len(), 1);
        assert_eq!(forecast.future_rows().len(), 2);
        assert_eq!(forecast.last().unwrap().ds, ds(3));
    }
}
