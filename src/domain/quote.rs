//! Daily price bar with an attached dividend.

use chrono::NaiveDate;
use std::cmp::Ordering;

/// One OHLCV bar plus the dividend paid on its date.
///
/// Quotes are values: attaching a dividend produces a new quote. Equality and
/// ordering only look at `date`, which is the key inside a store.
#[derive(Debug, Clone, Copy)]
pub struct Quote {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub dividend: f64,
}

impl Quote {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            dividend: 0.0,
        }
    }

    pub fn with_dividend(self, dividend: f64) -> Self {
        Self { dividend, ..self }
    }

    /// Combines two bars into one spanning both.
    ///
    /// The earlier bar supplies the date and open, the later one the close.
    /// Extremes are widened and volume/dividend are summed.
    pub fn merge(&self, other: &Quote) -> Quote {
        let (first, last) = if self.date <= other.date {
            (self, other)
        } else {
            (other, self)
        };
        Quote {
            date: first.date,
            open: first.open,
            high: first.high.max(last.high),
            low: first.low.min(last.low),
            close: last.close,
            volume: first.volume + last.volume,
            dividend: first.dividend + last.dividend,
        }
    }
}

/// max(high - low, |high - prev_close|, |low - prev_close|)
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

impl PartialEq for Quote {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
    }
}

impl Eq for Quote {}

impl PartialOrd for Quote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quote {
    fn cmp(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}
