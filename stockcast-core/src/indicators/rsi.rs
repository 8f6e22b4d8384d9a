//! Relative Strength Index (RSI), simple-average form.
//!
//! avg_gain / avg_loss are plain rolling means of the last `period` changes.
//! The first bar has no change and counts as a zero change, so the first
//! value lands at index period - 1.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → NaN.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("RSI_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        // gains[i] / losses[i] describe the change into bar i; bar 0 has none
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let ch = closes[i] - closes[i - 1];
            gains[i] = ch.max(0.0);
            losses[i] = (-ch).max(0.0);
        }

        let p = self.period as f64;
        let mut sum_gain: f64 = gains[..self.period].iter().sum();
        let mut sum_loss: f64 = losses[..self.period].iter().sum();
        result[self.period - 1] = compute_rsi(sum_gain / p, sum_loss / p);

        for i in self.period..n {
            sum_gain += gains[i] - gains[i - self.period];
            sum_loss += losses[i] - losses[i - self.period];
            result[i] = compute_rsi(sum_gain / p, sum_loss / p);
        }
        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    // Rolling sums can drift a hair below zero.
    let (g, l) = (avg_gain.max(0.0), avg_loss.max(0.0));
    if g <= f64::EPSILON && l <= f64::EPSILON {
        f64::NAN
    } else if l <= f64::EPSILON {
        100.0
    } else if g <= f64::EPSILON {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + g / l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn all_gains_is_100() {
        let result = Rsi::new(3).compute(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0, 1e-9);
        assert_approx(result[4], 100.0, 1e-9);
    }

    #[test]
    fn all_losses_is_0() {
        let result = Rsi::new(3).compute(&[105.0, 104.0, 103.0, 102.0]);
        assert_approx(result[2], 0.0, 1e-9);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn flat_has_no_value() {
        let result = Rsi::new(3).compute(&[7.0; 5]);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn first_value_counts_the_opening_bar_as_no_change() {
        // window at index 2: changes 0 (bar 0), -1, +2 → gain 2/3, loss 1/3
        let result = Rsi::new(3).compute(&[10.0, 9.0, 11.0]);
        assert_eq!(Rsi::new(3).lookback(), 2);
        assert_approx(result[2], 100.0 - 100.0 / 3.0, 1e-9);
    }

    #[test]
    fn mixed_uses_simple_means() {
        // changes +0.34, -0.25, -0.48 → gain 0.34, loss 0.73
        let result = Rsi::new(3).compute(&[44.0, 44.34, 44.09, 43.61]);
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);
    }

    #[test]
    fn rolling_window_drops_old_changes() {
        // window of 2: at index 3 the changes are -1, +1
        let result = Rsi::new(2).compute(&[10.0, 15.0, 14.0, 15.0]);
        assert_approx(result[3], 50.0, 1e-9);
    }

    #[test]
    fn bounded() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        for (i, v) in Rsi::new(3).compute(&closes).into_iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "out of bounds at {i}: {v}");
            }
        }
    }
}
