//! Field extraction from a quote snapshot: zero-fill and dividend back-adjustment.
//!
//! Both transforms are explicit sequential passes over an owned `Vec<f64>`.

use crate::domain::quote::Quote;
use crate::domain::stats::{mean_non_zero, min_non_zero};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub fn get(self, quote: &Quote) -> f64 {
        match self {
            Field::Open => quote.open,
            Field::High => quote.high,
            Field::Low => quote.low,
            Field::Close => quote.close,
            Field::Volume => quote.volume,
        }
    }

    /// Replacement for a zero value on the first bar of a window.
    ///
    /// Volume has no fallback; a zero volume is a real observation.
    fn first_bar_fallback(self, quote: &Quote) -> Option<f64> {
        match self {
            Field::High => Some(quote.open.max(quote.low).max(quote.close)),
            Field::Low => Some(min_non_zero(&[quote.open, quote.high, quote.close])),
            Field::Open => Some(mean_non_zero(&[quote.high, quote.low, quote.close])),
            Field::Close => Some(mean_non_zero(&[quote.open, quote.high, quote.low])),
            Field::Volume => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        };
        f.write_str(name)
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" | "o" => Ok(Field::Open),
            "high" | "h" => Ok(Field::High),
            "low" | "l" => Ok(Field::Low),
            "close" | "c" => Ok(Field::Close),
            "volume" | "v" => Ok(Field::Volume),
            other => Err(format!("unknown field '{other}'")),
        }
    }
}

/// Options applied while extracting a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub fix_zeros: bool,
    pub apply_dividend: bool,
    pub reverse: bool,
}

/// Builds the numeric series for `field` from date-ascending `quotes`.
pub fn extract(quotes: &[Quote], field: Field, options: ExtractOptions) -> Vec<f64> {
    let raw: Vec<f64> = quotes.iter().map(|q| field.get(q)).collect();
    let mut data = if options.fix_zeros && field != Field::Volume {
        fix_zeros(&raw, quotes, field)
    } else {
        raw
    };

    if options.apply_dividend && field != Field::Volume {
        let dividends: Vec<f64> = quotes.iter().map(|q| q.dividend).collect();
        if dividends.iter().any(|d| *d != 0.0) {
            back_adjust(&mut data, &dividends);
        }
    }

    if options.reverse {
        data.reverse();
    }
    data
}

/// Replaces zero samples: later bars carry the previous (already fixed) value
/// forward, the first bar falls back to the other prices of the same quote.
pub fn fix_zeros(raw: &[f64], quotes: &[Quote], field: Field) -> Vec<f64> {
    let mut data: Vec<f64> = Vec::with_capacity(raw.len());
    for (i, &value) in raw.iter().enumerate() {
        let fixed = if value != 0.0 {
            value
        } else if i > 0 {
            data[i - 1]
        } else {
            quotes
                .first()
                .and_then(|q| field.first_bar_fallback(q))
                .unwrap_or(value)
        };
        data.push(fixed);
    }
    data
}

/// Shifts history down by every dividend paid later.
///
/// Walking backwards, each bar loses the total of dividends paid on any later
/// bar; a bar's own dividend only affects the bars before it.
pub fn back_adjust(data: &mut [f64], dividends: &[f64]) {
    let mut accumulated = 0.0;
    for (value, dividend) in data.iter_mut().zip(dividends.iter()).rev() {
        *value -= accumulated;
        accumulated += dividend;
    }
}
