//! Technical indicators over closing prices.
//!
//! Indicators are pure functions: closes in, a series of the same length out.
//! Warmup positions hold `f64::NAN`. They are used as chart overlays and as
//! extra columns in the series export; forecasting never reads them.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::Bollinger;
pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::CleanSeries;

/// A single-series indicator.
///
/// No output value at index t may depend on prices after t.
pub trait Indicator: Send + Sync {
    /// Column name (e.g. "SMA_20").
    fn name(&self) -> &str;

    /// Number of leading positions that are always `NaN`.
    fn lookback(&self) -> usize;

    /// Compute over the full close series. Output has the same length.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// A computed indicator column.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl IndicatorColumn {
    /// Value at `index`, `None` during warmup.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    /// True for indicators on the price scale (overlayable on the chart).
    pub fn is_price_scale(&self) -> bool {
        !(self.name.starts_with("RSI") || self.name.starts_with("MACD"))
    }
}

/// The standard set: SMA_20, EMA_20, RSI_14, MACD 12/26/9, Bollinger 20/2.
pub fn standard_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::line(12, 26, 9)),
        Box::new(Macd::signal(12, 26, 9)),
        Box::new(Bollinger::upper(20, 2.0)),
        Box::new(Bollinger::lower(20, 2.0)),
    ]
}

/// Compute every indicator in `set` over the series closes.
pub fn compute_all(series: &CleanSeries, set: &[Box<dyn Indicator>]) -> Vec<IndicatorColumn> {
    let closes = series.values();
    set.iter()
        .map(|ind| IndicatorColumn {
            name: ind.name().to_string(),
            values: ind.compute(&closes),
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::test_support::linear;

    #[test]
    fn standard_set_names() {
        let names: Vec<String> = standard_indicators()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "SMA_20",
                "EMA_20",
                "RSI_14",
                "MACD",
                "MACD_Signal",
                "Bollinger_Upper",
                "Bollinger_Lower"
            ]
        );
    }

    #[test]
    fn columns_match_series_length() {
        let series = linear(30, 100.0, 1.0);
        let cols = compute_all(&series, &standard_indicators());
        assert_eq!(cols.len(), 7);
        assert!(cols.iter().all(|c| c.values.len() == 30));
        assert_eq!(cols[0].get(18), None);
        assert!(cols[0].get(19).is_some());
        let overlayable: Vec<&str> = cols
            .iter()
            .filter(|c| c.is_price_scale())
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(
            overlayable,
            ["SMA_20", "EMA_20", "Bollinger_Upper", "Bollinger_Lower"]
        );
    }

    /// Truncating the input must not change earlier outputs.
    #[test]
    fn no_look_ahead() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + ((i * 7) % 11) as f64).collect();
        for ind in standard_indicators() {
            let full = ind.compute(&closes);
            let cut = ind.compute(&closes[..40]);
            for i in 0..40 {
                assert!(
                    (full[i].is_nan() && cut[i].is_nan()) || full[i] == cut[i],
                    "{} differs at {i}",
                    ind.name()
                );
            }
        }
    }
}
