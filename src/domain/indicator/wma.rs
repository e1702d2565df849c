//! Weighted Moving Average.
//!
//! The newest sample weighs `n`, the one before `n-1`, down to 1. While fewer
//! than `n` samples exist, the weights are clipped to what is available.

use crate::domain::indicator::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wma {
    period: usize,
}

impl Wma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Wma {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        if self.period == 0 || values.is_empty() {
            return out;
        }

        out[0] = values[0];
        for i in 1..values.len() {
            let mut num = 0.0;
            let mut den = 0.0;
            for j in 0..=i.min(self.period - 1) {
                let weight = (self.period - j) as f64;
                num += values[i - j] * weight;
                den += weight;
            }
            out[i] = num / den;
        }
        out
    }

    fn seed_size(&self, _weight: f64) -> usize {
        self.period
    }
}
