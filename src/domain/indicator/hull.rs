//! Hull Moving Average: WMA(√n) of 2·WMA(n/2) − WMA(n), integer periods.

use crate::domain::indicator::{Indicator, Wma};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hull {
    period: usize,
}

impl Hull {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Hull {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        if self.period == 0 || values.is_empty() {
            return vec![0.0; values.len()];
        }

        let full = Wma::new(self.period).first_series(values);
        let half = Wma::new(self.period / 2).first_series(values);
        let raw: Vec<f64> = half
            .iter()
            .zip(full.iter())
            .map(|(h, f)| 2.0 * h - f)
            .collect();

        let root = (self.period as f64).sqrt().floor() as usize;
        Wma::new(root).first_series(&raw)
    }

    fn seed_size(&self, _weight: f64) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn hull_matches_composition() {
        let values = [10.0, 11.0, 13.0, 12.0, 15.0, 17.0, 16.0, 18.0, 21.0, 20.0];
        let full = Wma::new(9).first_series(&values);
        let half = Wma::new(4).first_series(&values);
        let raw: Vec<f64> = (0..values.len()).map(|i| 2.0 * half[i] - full[i]).collect();
        let expected = Wma::new(3).first_series(&raw);

        let result = Hull::new(9).first_series(&values);
        for (got, want) in result.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn hull_constant_input_stays_constant() {
        for v in Hull::new(16).first_series(&[50.0; 30]) {
            assert_abs_diff_eq!(v, 50.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn hull_first_value_is_first_input() {
        let result = Hull::new(4).first_series(&[8.0, 9.0, 10.0]);
        assert_abs_diff_eq!(result[0], 8.0, epsilon = 1e-12);
    }

    #[test]
    fn hull_tracks_linear_trend_closer_than_wma() {
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let hull = Hull::new(16).first_series(&values);
        let wma = Wma::new(16).first_series(&values);
        let last = values.len() - 1;
        assert!((hull[last] - values[last]).abs() < (wma[last] - values[last]).abs());
    }

    #[test]
    fn hull_period_0_is_all_zero() {
        assert_eq!(Hull::new(0).first_series(&[1.0, 2.0]), vec![0.0, 0.0]);
    }
}
