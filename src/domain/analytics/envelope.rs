//! Envelope channel width search.
//!
//! Finds the smallest symmetric channel around a moving average, as a fraction
//! of the average, whose coverage reaches a target. Coverage is assumed to be
//! non-decreasing in the width; the bisection does not re-check it.

use crate::domain::analytics::{Bars, Span};
use crate::domain::error::QuotelabError;
use crate::domain::indicator::{Ema, Indicator, Sma};
use crate::domain::quote_store::{QuoteStore, Window};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Widest channel tried by the doubling phase.
const MAX_WIDTH: f64 = 2_147_483_647.0;
const MAX_BISECTIONS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AverageKind {
    #[default]
    Simple,
    Exponential,
}

/// How coverage of a channel is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoverageBy {
    /// Share of the summed high-low range that falls inside the channel.
    #[default]
    ByPrice,
    /// Share of bars lying entirely inside the channel.
    ByBar,
}

impl FromStr for AverageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" | "sma" => Ok(AverageKind::Simple),
            "exponential" | "ema" => Ok(AverageKind::Exponential),
            other => Err(format!("unknown average '{other}'")),
        }
    }
}

impl FromStr for CoverageBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" | "byprice" => Ok(CoverageBy::ByPrice),
            "bar" | "bybar" => Ok(CoverageBy::ByBar),
            other => Err(format!("unknown coverage mode '{other}'")),
        }
    }
}

impl fmt::Display for AverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AverageKind::Simple => f.write_str("simple"),
            AverageKind::Exponential => f.write_str("exponential"),
        }
    }
}

impl fmt::Display for CoverageBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageBy::ByPrice => f.write_str("price"),
            CoverageBy::ByBar => f.write_str("bar"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeQuery {
    pub count: usize,
    pub end: Option<NaiveDate>,
    pub period: usize,
    pub average: AverageKind,
    pub by: CoverageBy,
    pub coverage: f64,
    pub delta: f64,
}

impl EnvelopeQuery {
    fn validate(&self) -> Result<(), QuotelabError> {
        if self.period == 0 {
            return Err(QuotelabError::invalid("period", "must be positive"));
        }
        if !(self.coverage > 0.0 && self.coverage <= 1.0) {
            return Err(QuotelabError::invalid("coverage", "must be in (0, 1]"));
        }
        if !(self.delta > 0.0 && self.delta.is_finite()) {
            return Err(QuotelabError::invalid("delta", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub span: Span,
    pub period: usize,
    pub average: AverageKind,
    pub by: CoverageBy,
    pub coverage: f64,
    /// Channel half-width as a fraction of the moving average.
    pub value: f64,
}

/// Coverage of a channel `ma·(1 ± width)` over indices `period..`.
///
/// An empty evaluation range counts as fully covered.
pub fn coverage(
    ma: &[f64],
    high: &[f64],
    low: &[f64],
    period: usize,
    width: f64,
    by: CoverageBy,
) -> f64 {
    let mut range = 0.0;
    let mut covered = 0.0;
    for i in period..ma.len() {
        let (hi, lo, avg) = (high[i], low[i], ma[i]);
        let top = hi.min(avg + avg * width);
        let bottom = lo.max(avg - avg * width);
        match by {
            CoverageBy::ByPrice => {
                range += hi - lo;
                covered += (top - bottom).max(0.0);
            }
            CoverageBy::ByBar => {
                range += 1.0;
                if top >= hi && bottom <= lo {
                    covered += 1.0;
                }
            }
        }
    }
    if range == 0.0 { 1.0 } else { covered / range }
}

/// Doubles the width from `delta/2` until `cover` reaches `target`, then
/// bisects the last bracket down to `delta`.
fn search_width(
    target: f64,
    delta: f64,
    cover: impl Fn(f64) -> f64,
) -> Result<f64, QuotelabError> {
    let mut up = delta / 2.0;
    let mut reached = 0.0;
    while reached < target && up < MAX_WIDTH {
        up *= 2.0;
        reached = cover(up);
    }
    if reached < target {
        return Err(QuotelabError::CoverageUnresolved { target, width: up });
    }

    let mut down = up / 2.0;
    let mut mid = up;
    let mut steps = 0;
    while (up - down).abs() > delta {
        if steps == MAX_BISECTIONS {
            return Err(QuotelabError::CoverageUnresolved { target, width: mid });
        }
        steps += 1;
        mid = (down + up) / 2.0;
        let c = cover(mid);
        if c < target {
            down = mid;
        } else if c > target {
            up = mid;
        } else {
            break;
        }
    }
    Ok(mid)
}

/// Searches the channel width for the last `count` bars at or before `end`.
///
/// `period` extra bars before the window warm up the moving average.
pub fn envelope(
    store: &QuoteStore,
    query: &EnvelopeQuery,
) -> Result<Option<Envelope>, QuotelabError> {
    query.validate()?;

    let bars = Bars::load(
        store,
        Window::last(query.count.saturating_add(query.period), query.end),
    );
    let reported = bars.len().min(query.count);
    if reported == 0 {
        return Ok(None);
    }

    let ma = match query.average {
        AverageKind::Simple => Sma::new(query.period).first_series(&bars.close),
        AverageKind::Exponential => Ema::new(query.period).first_series(&bars.close),
    };
    let width = search_width(query.coverage, query.delta, |w| {
        coverage(&ma, &bars.high, &bars.low, query.period, w, query.by)
    })?;

    let dates = &bars.dates[bars.len() - reported..];
    debug!(
        ticker = store.ticker().unwrap_or("-"),
        period = query.period,
        by = %query.by,
        target = query.coverage,
        width,
        "envelope"
    );

    Ok(Some(Envelope {
        span: Span {
            ticker: store.ticker().map(str::to_string),
            count: reported,
            start_at: None,
            end_at: query.end,
            first_day: dates[0],
            last_day: dates[reported - 1],
        },
        period: query.period,
        average: query.average,
        by: query.by,
        coverage: query.coverage,
        value: width,
    }))
}
