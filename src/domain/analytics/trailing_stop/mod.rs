//! Trailing stops: Parabolic, SafeZone and Chandelier.
//!
//! All three walk the bars in date order keeping a running stop that only
//! ever tightens. The first bar after the first whose range crosses the stop
//! held coming into it records the exit.

pub mod chandelier;
pub mod parabolic;
pub mod safe_zone;

pub use chandelier::chandelier_stop;
pub use parabolic::parabolic_stop;
pub use safe_zone::{average_penetration, safe_zone_stop};

use crate::domain::analytics::{Bars, Side, Span};
use crate::domain::error::{QuotelabError, check_range};
use crate::domain::quote_store::{QuoteStore, Window};
use crate::domain::rounding::Direction;
use chrono::NaiveDate;
use tracing::debug;

/// Parameters shared by every stop variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopRequest {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Initial stop price.
    pub stop_loss: f64,
    pub side: Side,
}

impl StopRequest {
    fn validate(&self) -> Result<(), QuotelabError> {
        if !(self.stop_loss > 0.0 && self.stop_loss.is_finite()) {
            return Err(QuotelabError::invalid("stop_loss", "must be positive"));
        }
        check_range(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParabolicParams {
    /// Acceleration step, also the starting factor.
    pub factor: f64,
    /// Cap on the acceleration factor.
    pub limit: f64,
}

impl Default for ParabolicParams {
    fn default() -> Self {
        Self {
            factor: 0.02,
            limit: 0.2,
        }
    }
}

/// Parameters of the band-style stops (SafeZone and Chandelier).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    pub coefficient: f64,
    pub period: usize,
}

impl BandParams {
    fn validate(&self) -> Result<(), QuotelabError> {
        if !(self.coefficient > 0.0 && self.coefficient.is_finite()) {
            return Err(QuotelabError::invalid("coefficient", "must be positive"));
        }
        if self.period == 0 {
            return Err(QuotelabError::invalid("period", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopExit {
    pub date: NaiveDate,
    /// Fill price, `None` if the bar did not actually trade through the stop.
    pub fill: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailingStop {
    pub span: Span,
    /// Final stop.
    pub value: f64,
    pub dates: Vec<NaiveDate>,
    pub stops: Vec<f64>,
    pub exit: Option<StopExit>,
}

/// Whether a bar with this range trades through `stop`.
pub(crate) fn penetrated(stop: f64, high: f64, low: f64, side: Side) -> bool {
    match side {
        Side::Long => stop > low,
        Side::Short => stop < high,
    }
}

/// Price a stop order fills at on a bar.
///
/// An open already beyond the stop fills at the open, a bar reaching the stop
/// fills at the stop, and anything else does not fill.
pub fn exit_fill(stop: f64, open: f64, high: f64, low: f64, side: Side) -> Option<f64> {
    match side {
        Side::Long if open < stop => Some(open),
        Side::Long if low < stop => Some(stop),
        Side::Short if open > stop => Some(open),
        Side::Short if high > stop => Some(stop),
        _ => None,
    }
}

/// Never lets the stop loosen.
pub(crate) fn tighten(side: Side, current: f64, offered: f64) -> f64 {
    match side {
        Side::Long => current.max(offered),
        Side::Short => current.min(offered),
    }
}

pub(crate) fn check_exit(
    exit: &mut Option<StopExit>,
    bars: &Bars,
    i: usize,
    stop: f64,
    side: Side,
) {
    if i > 0 && exit.is_none() && penetrated(stop, bars.high[i], bars.low[i], side) {
        *exit = Some(StopExit {
            date: bars.dates[i],
            fill: exit_fill(stop, bars.open[i], bars.high[i], bars.low[i], side),
        });
    }
}

pub(crate) fn build_result(
    store: &QuoteStore,
    request: &StopRequest,
    dates: Vec<NaiveDate>,
    stops: Vec<f64>,
    exit: Option<StopExit>,
) -> Option<TrailingStop> {
    let (first_day, last_day) = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return None,
    };
    let value = stops.last().copied().unwrap_or(request.stop_loss);
    debug!(
        ticker = store.ticker().unwrap_or("-"),
        side = %request.side,
        bars = stops.len(),
        value,
        exit = ?exit.map(|e| e.date),
        "trailing stop"
    );
    Some(TrailingStop {
        span: Span {
            ticker: store.ticker().map(str::to_string),
            count: stops.len(),
            start_at: request.start,
            end_at: request.end,
            first_day,
            last_day,
        },
        value,
        dates,
        stops,
        exit,
    })
}

/// Shared loop of SafeZone and Chandelier.
///
/// With a `start`, the `period + 2` bars up to and including it are loaded as
/// well so `offers` sees warmed-up state; bars before `start` keep the initial
/// stop and are trimmed from the result. Offers are rounded protectively:
/// down for longs, up for shorts.
pub(crate) fn band_stop(
    store: &QuoteStore,
    request: &StopRequest,
    params: &BandParams,
    offers: impl FnOnce(&Bars) -> Vec<f64>,
) -> Result<Option<TrailingStop>, QuotelabError> {
    request.validate()?;
    params.validate()?;

    let seed_from = request.start.and_then(|start| {
        store
            .dates(Window::last(params.period.saturating_add(2), Some(start)), false)
            .first()
            .copied()
    });
    let bars = Bars::load(store, Window::range(seed_from, request.end));
    if bars.is_empty() {
        return Ok(None);
    }

    let offered = offers(&bars);
    let rounding = store.rounding(match request.side {
        Side::Long => Direction::Floor,
        Side::Short => Direction::Ceiling,
    });

    let mut stop = request.stop_loss;
    let mut exit = None;
    let mut first = None;
    let mut stops = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if request.start.is_some_and(|start| bars.dates[i] < start) {
            continue;
        }
        first.get_or_insert(i);
        check_exit(&mut exit, &bars, i, stop, request.side);
        stop = tighten(request.side, stop, rounding.round(offered[i], store.step()));
        stops.push(stop);
    }

    let Some(first) = first else {
        return Ok(None);
    };
    let dates = bars.dates[first..].to_vec();
    Ok(build_result(store, request, dates, stops, exit))
}
