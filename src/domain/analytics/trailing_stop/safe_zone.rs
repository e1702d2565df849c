//! SafeZone trailing stop.
//!
//! The stop sits a multiple of the average adverse penetration beyond the
//! signal price: the low for longs, the high for shorts.

use crate::domain::analytics::Side;
use crate::domain::analytics::trailing_stop::{BandParams, StopRequest, TrailingStop, band_stop};
use crate::domain::error::QuotelabError;
use crate::domain::quote_store::QuoteStore;

/// Running mean of the non-zero one-sided moves of `signal` over `period` bars.
///
/// A long counts only drops (negative values), a short only rises.
pub fn average_penetration(signal: &[f64], period: usize, side: Side) -> Vec<f64> {
    let mut noise = vec![0.0; signal.len()];
    let mut avg = vec![0.0; signal.len()];
    let mut total = 0.0;
    let mut count: usize = 0;
    for i in 1..signal.len() {
        let step = signal[i] - signal[i - 1];
        noise[i] = match side {
            Side::Long => step.min(0.0),
            Side::Short => step.max(0.0),
        };
        if noise[i] != 0.0 {
            total += noise[i];
            count += 1;
        }
        if i > period && noise[i - period] != 0.0 {
            total -= noise[i - period];
            count -= 1;
        }
        avg[i] = if count > 0 { total / count as f64 } else { 0.0 };
    }
    avg
}

pub fn safe_zone_stop(
    store: &QuoteStore,
    request: &StopRequest,
    params: &BandParams,
) -> Result<Option<TrailingStop>, QuotelabError> {
    band_stop(store, request, params, |bars| {
        let signal = match request.side {
            Side::Long => &bars.low,
            Side::Short => &bars.high,
        };
        let noise = average_penetration(signal, params.period, request.side);
        signal
            .iter()
            .zip(noise.iter())
            .map(|(s, n)| s + n * params.coefficient)
            .collect()
    })
}
