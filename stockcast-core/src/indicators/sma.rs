//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a fixed window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// A period of zero is treated as one.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("SMA_{period}"),
        }
    }
}

impl Indicator for Sma {
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

        let mut sum: f64 = closes[..self.period].iter().sum();
        result[self.period - 1] = sum / self.period as f64;

        for i in self.period..n {
            sum += closes[i] - closes[i - self.period];
            result[i] = sum / self.period as f64;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn sma_3_known_values() {
        let result = Sma::new(3).compute(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, 1e-10);
        assert_approx(result[3], 12.0, 1e-10);
        assert_approx(result[4], 13.0, 1e-10);
    }

    #[test]
    fn short_input_is_all_nan() {
        assert!(Sma::new(20).compute(&[1.0; 5]).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_period_behaves_as_one() {
        let sma = Sma::new(0);
        assert_eq!(sma.lookback(), 0);
        assert_eq!(sma.compute(&[4.0, 5.0]), vec![4.0, 5.0]);
    }
}
