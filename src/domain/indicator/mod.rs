//! Moving-average indicator family.
//!
//! Every indicator maps an input slice to output series of the same length.
//! There is no warm-up gap: the first output is seeded from the first input,
//! and a zero period yields all-zero output.
//!
//! - [`Sma`], [`Ema`], [`Wma`]: single-series averages
//! - [`Hull`]: built from three weighted averages
//! - [`Macd`]: three series built from exponential averages
//! - [`IndicatorType`]: closed set of the above, usable as a map key

pub mod ema;
pub mod hull;
pub mod macd;
pub mod sma;
pub mod wma;

pub use ema::Ema;
pub use hull::Hull;
pub use macd::{Macd, MacdSeries};
pub use sma::Sma;
pub use wma::Wma;

use std::fmt;

/// Capability shared by all indicators in the family.
pub trait Indicator {
    /// Primary output series.
    fn first_series(&self, values: &[f64]) -> Vec<f64>;

    /// Every output series, primary first.
    fn all_series(&self, values: &[f64]) -> Vec<Vec<f64>> {
        vec![self.first_series(values)]
    }

    /// Bars needed before the output carries at least `weight` of its
    /// steady-state influence.
    fn seed_size(&self, weight: f64) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema {
        period: usize,
        sma_seed: bool,
    },
    Wma(usize),
    Hull(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        sma_seed: bool,
    },
}

impl Indicator for IndicatorType {
    fn first_series(&self, values: &[f64]) -> Vec<f64> {
        match *self {
            IndicatorType::Sma(period) => Sma::new(period).first_series(values),
            IndicatorType::Ema { period, sma_seed } => {
                Ema::with_sma_seed(period, sma_seed).first_series(values)
            }
            IndicatorType::Wma(period) => Wma::new(period).first_series(values),
            IndicatorType::Hull(period) => Hull::new(period).first_series(values),
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                sma_seed,
            } => Macd::with_sma_seed(fast, slow, signal, sma_seed).first_series(values),
        }
    }

    fn all_series(&self, values: &[f64]) -> Vec<Vec<f64>> {
        match *self {
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                sma_seed,
            } => Macd::with_sma_seed(fast, slow, signal, sma_seed).all_series(values),
            _ => vec![self.first_series(values)],
        }
    }

    fn seed_size(&self, weight: f64) -> usize {
        match *self {
            IndicatorType::Sma(period) => Sma::new(period).seed_size(weight),
            IndicatorType::Ema { period, sma_seed } => {
                Ema::with_sma_seed(period, sma_seed).seed_size(weight)
            }
            IndicatorType::Wma(period) => Wma::new(period).seed_size(weight),
            IndicatorType::Hull(period) => Hull::new(period).seed_size(weight),
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                sma_seed,
            } => Macd::with_sma_seed(fast, slow, signal, sma_seed).seed_size(weight),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema { period, .. } => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Hull(period) => write!(f, "HMA({})", period),
            IndicatorType::Macd {
                fast, slow, signal, ..
            } => write!(f, "MACD({},{},{})", fast, slow, signal),
        }
    }
}
