//! Moving Average Convergence Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow), signal = EMA(signal) of the MACD line,
//! histogram = MACD line - signal.

use crate::domain::indicator::{Ema, Indicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

/// The three MACD output series, index-aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_sma_seed(fast, slow, signal, false)
    }

    pub fn with_sma_seed(fast: usize, slow: usize, signal: usize, sma_seed: bool) -> Self {
        Self {
            fast: Ema::with_sma_seed(fast, sma_seed),
            slow: Ema::with_sma_seed(slow, sma_seed),
            signal: Ema::with_sma_seed(signal, sma_seed),
        }
    }

    pub fn compute(&self, values: &[f64]) -> MacdSeries {
        let fast = self.fast.first_series(values);
        let slow = self.slow.first_series(values);
        let line: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = self.signal.first_series(&line);
        let histogram = line.iter().zip(signal.iter()).map(|(m, s)| m - s).collect();
        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}

impl Indicator for Macd {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        self.compute(values).line
    }

    fn all_series(&self, values: &[f64]) -> Vec<Vec<f64>> {
        let series = self.compute(values);
        vec![series.line, series.signal, series.histogram]
    }

    fn seed_size(&self, weight: f64) -> usize {
        self.fast
            .seed_size(weight)
            .max(self.slow.seed_size(weight))
            .saturating_add(self.signal.seed_size(weight))
    }
}
