//! Bollinger Bands: rolling mean plus or minus a multiple of the rolling std.
//!
//! Upper and lower are separate `Indicator` instances.
//! Uses the sample standard deviation (divide by N - 1), so a period of one
//! never produces a value.
//! Lookback: period - 1.

use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper, "Bollinger_Upper")
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower, "Bollinger_Lower")
    }

    fn new(period: usize, multiplier: f64, band: BollingerBand, name: &str) -> Self {
        Self {
            period: period.max(1),
            multiplier,
            band,
            name: name.to_string(),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let mut result = vec![f64::NAN; n];
        if self.period < 2 || n < self.period {
            return result;
        }

        let p = self.period as f64;
        for (i, window) in closes.windows(self.period).enumerate() {
            let mean = window.iter().sum::<f64>() / p;
            let var = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (p - 1.0);
            let offset = self.multiplier * var.sqrt();
            result[i + self.period - 1] = match self.band {
                BollingerBand::Upper => mean + offset,
                BollingerBand::Lower => mean - offset,
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn bands_use_sample_std() {
        // window [2, 4, 6]: mean 4, sample var (4 + 0 + 4) / 2 = 4, std 2
        let closes = [2.0, 4.0, 6.0];
        let upper = Bollinger::upper(3, 2.0).compute(&closes);
        let lower = Bollinger::lower(3, 2.0).compute(&closes);
        assert!(upper[1].is_nan());
        assert_approx(upper[2], 8.0, 1e-12);
        assert_approx(lower[2], 0.0, 1e-12);
    }

    #[test]
    fn flat_prices_collapse_onto_the_mean() {
        let upper = Bollinger::upper(20, 2.0).compute(&[50.0; 25]);
        assert_eq!(Bollinger::upper(20, 2.0).lookback(), 19);
        assert!(upper[18].is_nan());
        for v in &upper[19..] {
            assert_approx(*v, 50.0, 1e-12);
        }
    }

    #[test]
    fn upper_never_below_lower() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 13) % 7) as f64).collect();
        let upper = Bollinger::upper(20, 2.0).compute(&closes);
        let lower = Bollinger::lower(20, 2.0).compute(&closes);
        for i in 19..40 {
            assert!(upper[i] >= lower[i]);
        }
    }

    #[test]
    fn period_one_has_no_values() {
        assert!(Bollinger::upper(1, 2.0)
            .compute(&[1.0, 2.0])
            .iter()
            .all(|v| v.is_nan()));
    }
}
