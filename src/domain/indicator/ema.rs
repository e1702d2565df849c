//! Exponential Moving Average.
//!
//! k = 2/(n+1), v[0] = x[0], then v[i] = v[i-1] + k*(x[i] - v[i-1]).
//! With an SMA seed, bars 1..n-1 are averaged the simple way first.

use crate::domain::indicator::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ema {
    period: usize,
    sma_seed: bool,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::with_sma_seed(period, false)
    }

    pub fn with_sma_seed(period: usize, sma_seed: bool) -> Self {
        Self { period, sma_seed }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn smoothing(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        if self.period == 0 || values.is_empty() {
            return out;
        }

        let n = self.period as f64;
        let k = self.smoothing();
        let mut ema = values[0];
        out[0] = ema;

        let mut start = 1;
        if self.sma_seed {
            let seed_end = self.period.min(values.len());
            for i in start..seed_end {
                ema = ema + values[i] / n - values[0] / n;
                out[i] = ema;
            }
            start = seed_end.max(1);
        }
        for i in start..values.len() {
            ema += k * (values[i] - ema);
            out[i] = ema;
        }
        out
    }

    /// ceil(ln(1 - weight) / ln(1 - k))
    fn seed_size(&self, weight: f64) -> usize {
        if self.period == 0 {
            return 0;
        }
        let bars = ((1.0 - weight).ln() / (1.0 - self.smoothing()).ln()).ceil();
        if bars.is_nan() || bars <= 0.0 {
            0
        } else if bars >= usize::MAX as f64 {
            usize::MAX
        } else {
            bars as usize
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ema_known_values() {
        let result = Ema::new(3).first_series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let expected = [1.0, 1.5, 2.25, 3.13, 4.06, 5.03];
        for (got, want) in result.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 0.01);
        }
    }

    #[test]
    fn ema_first_value_is_first_input() {
        let result = Ema::new(10).first_series(&[42.0, 43.0]);
        assert_eq!(result[0], 42.0);
    }

    #[test]
    fn ema_sma_seed_averages_early_bars() {
        // bars 1..3 use the simple rule: 1 + 2/3 - 1/3, then + 3/3 - 1/3
        let result = Ema::with_sma_seed(3, true).first_series(&[1.0, 2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(result[1], 1.0 + 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result[2], 2.0, epsilon = 1e-12);
        // then the exponential rule with k = 0.5
        assert_abs_diff_eq!(result[3], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn ema_sma_seed_shorter_than_period() {
        let result = Ema::with_sma_seed(10, true).first_series(&[4.0, 6.0]);
        assert_eq!(result.len(), 2);
        assert_abs_diff_eq!(result[1], 4.0 + 0.6 - 0.4, epsilon = 1e-12);
    }

    #[test]
    fn ema_constant_input_stays_constant() {
        for v in Ema::new(5).first_series(&[7.5; 12]) {
            assert_abs_diff_eq!(v, 7.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn ema_period_0_is_all_zero() {
        assert_eq!(Ema::new(0).first_series(&[1.0, 2.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn ema_seed_size() {
        // k = 0.5: ln(0.1)/ln(0.5) = 3.32 → 4
        assert_eq!(Ema::new(3).seed_size(0.9), 4);
        // k = 2/21: ln(0.01)/ln(19/21) = 46.04 → 47
        assert_eq!(Ema::new(20).seed_size(0.99), 47);
        assert_eq!(Ema::new(0).seed_size(0.9), 0);
    }
}
