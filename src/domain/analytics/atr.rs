//! Average True Range.
//!
//! Two smoothings are offered. [`windowed_atr`] averages the non-zero true
//! ranges of a trailing `period` window, dividing by how many there were.
//! [`wilder_atr`] is the classic `(prev·(p−1) + tr) / p` recurrence.

use crate::domain::analytics::{Bars, Span};
use crate::domain::error::QuotelabError;
use crate::domain::quote::true_range;
use crate::domain::quote_store::{QuoteStore, Window};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtrMethod {
    #[default]
    Windowed,
    Wilder,
}

impl fmt::Display for AtrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtrMethod::Windowed => f.write_str("windowed"),
            AtrMethod::Wilder => f.write_str("wilder"),
        }
    }
}

impl FromStr for AtrMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windowed" | "window" => Ok(AtrMethod::Windowed),
            "wilder" => Ok(AtrMethod::Wilder),
            other => Err(format!("unknown ATR method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AverageTrueRange {
    pub span: Span,
    pub period: usize,
    pub method: AtrMethod,
    /// Last average of the series.
    pub value: f64,
    /// Averages with the first `period` warm-up entries dropped.
    pub history: Vec<f64>,
}

/// True range per bar; the first bar has no prior close and uses high - low.
pub fn true_ranges(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    (0..high.len())
        .map(|i| {
            if i == 0 {
                high[i] - low[i]
            } else {
                true_range(high[i], low[i], close[i - 1])
            }
        })
        .collect()
}

/// Running mean of the non-zero true ranges among the last `period` bars.
pub fn windowed_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_ranges(high, low, close);
    let mut avg = vec![0.0; tr.len()];
    if tr.is_empty() {
        return avg;
    }

    let mut total = tr[0];
    let mut count: usize = if tr[0] != 0.0 { 1 } else { 0 };
    avg[0] = tr[0];
    for i in 1..tr.len() {
        if tr[i] != 0.0 {
            total += tr[i];
            count += 1;
        }
        if i >= period && tr[i - period] != 0.0 {
            total -= tr[i - period];
            count -= 1;
        }
        avg[i] = if count > 0 { total / count as f64 } else { 0.0 };
    }
    avg
}

/// Wilder smoothing seeded with the second bar's true range.
///
/// The first entry is 0 since there is no prior close to measure against.
pub fn wilder_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let tr = true_ranges(high, low, close);
    let mut atr = vec![0.0; tr.len()];
    if period == 0 {
        return atr;
    }
    let p = period as f64;
    for i in 1..tr.len() {
        atr[i] = if i > 1 {
            (atr[i - 1] * (p - 1.0) + tr[i]) / p
        } else {
            tr[i]
        };
    }
    atr
}

/// ATR over the last `count` bars at or before `end`, with `period` extra
/// bars read in front to warm the average up.
pub fn average_true_range(
    store: &QuoteStore,
    count: usize,
    end: Option<NaiveDate>,
    period: usize,
    method: AtrMethod,
) -> Result<Option<AverageTrueRange>, QuotelabError> {
    if period == 0 {
        return Err(QuotelabError::invalid("period", "must be positive"));
    }

    let bars = Bars::load(store, Window::last(count.saturating_add(period), end));
    let reported = bars.len().min(count);
    if reported == 0 {
        return Ok(None);
    }

    let series = match method {
        AtrMethod::Windowed => windowed_atr(&bars.high, &bars.low, &bars.close, period),
        AtrMethod::Wilder => wilder_atr(&bars.high, &bars.low, &bars.close, period),
    };
    let value = series.last().copied().unwrap_or(0.0);
    let history = series.get(period..).map(<[f64]>::to_vec).unwrap_or_default();
    let dates = &bars.dates[bars.len() - reported..];

    debug!(
        ticker = store.ticker().unwrap_or("-"),
        period,
        %method,
        value,
        "average true range"
    );

    Ok(Some(AverageTrueRange {
        span: Span {
            ticker: store.ticker().map(str::to_string),
            count: reported,
            start_at: None,
            end_at: end,
            first_day: dates[0],
            last_day: dates[reported - 1],
        },
        period,
        method,
        value,
        history,
    }))
}
