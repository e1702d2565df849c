//! Parabolic stop-and-reverse trailing stop.
//!
//! The stop closes in on the extreme price by a fraction that grows with each
//! new extreme, and is clamped so it never crosses the current or the prior
//! bar's range.

use crate::domain::analytics::trailing_stop::{
    ParabolicParams, StopRequest, TrailingStop, build_result, check_exit,
};
use crate::domain::analytics::{Bars, Side};
use crate::domain::error::QuotelabError;
use crate::domain::quote_store::{QuoteStore, Window};

impl ParabolicParams {
    fn validate(&self) -> Result<(), QuotelabError> {
        if !(self.factor > 0.0 && self.factor.is_finite()) {
            return Err(QuotelabError::invalid("factor", "must be positive"));
        }
        if !(self.limit >= self.factor && self.limit.is_finite()) {
            return Err(QuotelabError::invalid("limit", "must be at least the factor"));
        }
        Ok(())
    }
}

pub fn parabolic_stop(
    store: &QuoteStore,
    request: &StopRequest,
    params: &ParabolicParams,
) -> Result<Option<TrailingStop>, QuotelabError> {
    request.validate()?;
    params.validate()?;

    let bars = Bars::load(store, Window::range(request.start, request.end));
    if bars.is_empty() {
        return Ok(None);
    }

    let side = request.side;
    let (extreme, nearby, sign) = match side {
        Side::Long => (&bars.high, &bars.low, 1.0),
        Side::Short => (&bars.low, &bars.high, -1.0),
    };
    // true when `a` lies beyond `b` in the favourable direction
    let beyond = |a: f64, b: f64| match side {
        Side::Long => a > b,
        Side::Short => a < b,
    };
    let toward_stop = |a: f64, b: f64| match side {
        Side::Long => a.max(b),
        Side::Short => a.min(b),
    };

    let mut af = params.factor;
    let mut ep = extreme[0];
    let mut stop = request.stop_loss;
    let mut exit = None;
    let mut stops = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if beyond(extreme[i], ep) {
            ep = extreme[i];
            af = (af + params.factor).min(params.limit);
        }

        check_exit(&mut exit, &bars, i, stop, side);

        let mut offered = stop + sign * af * (ep - stop).abs();
        if beyond(offered, nearby[i]) {
            offered = toward_stop(nearby[i], stop);
        } else if i > 0 && beyond(offered, nearby[i - 1]) {
            offered = toward_stop(nearby[i - 1], stop);
        }
        stop = offered;
        stops.push(stop);
    }

    Ok(build_result(store, request, bars.dates, stops, exit))
}
