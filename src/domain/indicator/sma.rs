//! Simple Moving Average.
//!
//! v[0] = x[0], v[i] = v[i-1] + x[i]/n - x[max(i-n, 0)]/n.
//! Before the window fills, the first sample stands in for the missing ones.

use crate::domain::indicator::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        if self.period == 0 || values.is_empty() {
            return out;
        }

        let n = self.period as f64;
        let mut sma = values[0];
        out[0] = sma;
        for i in 1..values.len() {
            let dropped = values[i.saturating_sub(self.period)];
            sma = sma + values[i] / n - dropped / n;
            out[i] = sma;
        }
        out
    }

    fn seed_size(&self, _weight: f64) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_series(result: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(result.len(), expected.len());
        for (i, (got, want)) in result.iter().zip(expected.iter()).enumerate() {
            assert!(
                (got - want).abs() <= epsilon,
                "index {}: got {}, want {}",
                i,
                got,
                want
            );
        }
    }

    #[test]
    fn sma_short_series() {
        let result = Sma::new(3).first_series(&[5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_series(&result, &[5.0, 5.333, 6.0, 7.0, 8.0], 0.001);
    }

    #[test]
    fn sma_period_5() {
        let values = [11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0];
        let result = Sma::new(5).first_series(&values);
        assert_series(&result, &[11.0, 11.2, 11.6, 12.2, 13.0, 14.0, 15.0], 0.001);
    }

    #[test]
    fn sma_period_10_uneven() {
        let values = [15.0, 6.0, 10.0, 15.0, 9.0, 7.0, 11.0, 12.0, 14.0, 11.0, 5.0];
        let result = Sma::new(10).first_series(&values);
        let expected = [15.0, 14.1, 13.6, 13.6, 13.0, 12.2, 11.8, 11.5, 11.4, 11.0, 10.0];
        assert_series(&result, &expected, 0.001);
    }

    #[test]
    fn sma_period_3_and_4_same_input() {
        let values = [
            280.0, 288.0, 266.0, 295.0, 302.0, 310.0, 303.0, 328.0, 309.0, 315.0, 320.0, 332.0,
            310.0, 308.0, 320.0,
        ];
        let expected3 = [
            280.0, 282.666, 278.0, 283.0, 287.666, 302.333, 305.0, 313.666, 313.333, 317.333,
            314.666, 322.333, 320.666, 316.666, 312.666,
        ];
        assert_series(&Sma::new(3).first_series(&values), &expected3, 0.001);

        let expected4 = [
            280.0, 282.0, 278.5, 282.25, 287.75, 293.25, 302.5, 310.75, 312.5, 313.75, 318.0,
            319.0, 319.25, 317.5, 317.5,
        ];
        assert_series(&Sma::new(4).first_series(&values), &expected4, 0.01);
    }

    #[test]
    fn sma_equal_prices() {
        let result = Sma::new(4).first_series(&[100.0; 8]);
        for v in result {
            assert_abs_diff_eq!(v, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn sma_period_0_is_all_zero() {
        assert_eq!(Sma::new(0).first_series(&[1.0, 2.0, 3.0]), vec![0.0; 3]);
    }

    #[test]
    fn sma_empty_input() {
        assert!(Sma::new(3).first_series(&[]).is_empty());
    }

    #[test]
    fn sma_seed_size_is_period() {
        assert_eq!(Sma::new(14).seed_size(0.99), 14);
    }
}
