//! Chandelier trailing stop: a multiple of the windowed ATR hung from the
//! extreme price (the high for longs, the low for shorts).

use crate::domain::analytics::Side;
use crate::domain::analytics::atr::windowed_atr;
use crate::domain::analytics::trailing_stop::{BandParams, StopRequest, TrailingStop, band_stop};
use crate::domain::error::QuotelabError;
use crate::domain::quote_store::QuoteStore;

pub fn chandelier_stop(
    store: &QuoteStore,
    request: &StopRequest,
    params: &BandParams,
) -> Result<Option<TrailingStop>, QuotelabError> {
    band_stop(store, request, params, |bars| {
        let atr = windowed_atr(&bars.high, &bars.low, &bars.close, params.period);
        let (extreme, coefficient) = match request.side {
            Side::Long => (&bars.high, -params.coefficient),
            Side::Short => (&bars.low, params.coefficient),
        };
        extreme
            .iter()
            .zip(atr.iter())
            .map(|(ep, a)| ep + a * coefficient)
            .collect()
    })
}
