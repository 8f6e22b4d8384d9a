//! Moving Average Convergence Divergence (MACD).
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(signal span) of MACD.
//! All EMAs are the span form seeded with the first value, so both lines
//! have a value from index 0. Line and signal are separate `Indicator`s.

use super::{Ema, Indicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Macd, "MACD")
    }

    pub fn signal(fast: usize, slow: usize, signal: usize) -> Self {
        Self::new(fast, slow, signal, MacdLine::Signal, "MACD_Signal")
    }

    fn new(fast: usize, slow: usize, signal: usize, line: MacdLine, name: &str) -> Self {
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
            line,
            name: name.to_string(),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let fast = self.fast.compute(closes);
        let slow = self.slow.compute(closes);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => self.signal.compute(&macd),
        }
    }
}
