//! Opening gap statistics.
//!
//! An up gap opens above the prior high, a down gap below the prior low. A bar
//! is at most one of the two.

use crate::domain::analytics::{Bars, Span};
use crate::domain::error::{QuotelabError, check_range};
use crate::domain::quote_store::{QuoteStore, Window};
use crate::domain::stats;
use tracing::debug;

/// Statistics for one gap direction. All zero when there were no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GapSide {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Gap size at the requested coverage quantile.
    pub cover_gap: f64,
}

impl GapSide {
    pub fn from_gaps(gaps: &[f64], coverage: f64) -> Self {
        if gaps.is_empty() {
            return Self::default();
        }
        Self {
            count: gaps.len(),
            min: gaps.iter().copied().fold(f64::INFINITY, f64::min),
            max: gaps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: stats::mean(gaps),
            median: stats::median(gaps),
            std_dev: stats::std_dev(gaps),
            cover_gap: stats::cover_value(gaps, coverage),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub span: Span,
    /// Bar-to-bar comparisons made.
    pub step_count: usize,
    pub coverage: f64,
    pub up: GapSide,
    pub down: GapSide,
}

/// Splits the opening gaps of consecutive bars into (up, down).
pub fn opening_gaps(open: &[f64], high: &[f64], low: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut up = Vec::new();
    let mut down = Vec::new();
    for i in 1..open.len() {
        if open[i] > high[i - 1] {
            up.push(open[i] - high[i - 1]);
        } else if open[i] < low[i - 1] {
            down.push(low[i - 1] - open[i]);
        }
    }
    (up, down)
}

pub fn gap(
    store: &QuoteStore,
    window: Window,
    coverage: f64,
) -> Result<Option<Gap>, QuotelabError> {
    if !(0.0..=1.0).contains(&coverage) {
        return Err(QuotelabError::invalid("coverage", "must be in [0, 1]"));
    }
    let (start_at, end_at) = match window {
        Window::Range { start, end } => {
            check_range(start, end)?;
            (start, end)
        }
        Window::Last { end, .. } => (None, end),
    };

    let bars = Bars::load(store, window);
    if bars.is_empty() {
        return Ok(None);
    }

    let (up, down) = opening_gaps(&bars.open, &bars.high, &bars.low);
    let step_count = bars.len() - 1;
    debug!(
        ticker = store.ticker().unwrap_or("-"),
        steps = step_count,
        up = up.len(),
        down = down.len(),
        "gap"
    );

    Ok(Some(Gap {
        span: Span {
            ticker: store.ticker().map(str::to_string),
            count: bars.len(),
            start_at,
            end_at,
            first_day: bars.dates[0],
            last_day: bars.dates[bars.len() - 1],
        },
        step_count,
        coverage,
        up: GapSide::from_gaps(&up, coverage),
        down: GapSide::from_gaps(&down, coverage),
    }))
}
