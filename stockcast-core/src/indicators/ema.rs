//! Exponential Moving Average (EMA), span form.
//!
//! alpha = 2 / (span + 1)
//! EMA[0] = close[0]; EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1]
//! Lookback: 0. Early values lean on the first close.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        let span = span.max(1);
        Self {
            span,
            name: format!("EMA_{span}"),
        }
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let mut result = Vec::with_capacity(closes.len());
        let mut prev: Option<f64> = None;
        for &c in closes {
            let next = match prev {
                None => c,
                Some(p) => alpha * c + (1.0 - alpha) * p,
            };
            result.push(next);
            prev = Some(next);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn seeded_with_first_close() {
        // span 3 → alpha 0.5
        let result = Ema::new(3).compute(&[10.0, 12.0, 14.0]);
        assert_approx(result[0], 10.0, 1e-10);
        assert_approx(result[1], 11.0, 1e-10);
        assert_approx(result[2], 12.5, 1e-10);
    }

    #[test]
    fn span_one_tracks_closes() {
        assert_eq!(Ema::new(1).compute(&[3.0, 7.0, 5.0]), vec![3.0, 7.0, 5.0]);
    }

    #[test]
    fn empty_input() {
        assert!(Ema::new(20).compute(&[]).is_empty());
    }
}
