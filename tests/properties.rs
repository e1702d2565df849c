//! Property tests for store and analytics invariants.
//!
//! Uses proptest to verify:
//! 1. Resampling aggregates every bucket from its daily bars
//! 2. Dividend adjustment is a no-op without dividends
//! 3. Zero-period averages are all zero
//! 4. ATR of a constant series is zero
//! 5. Trailing stops only tighten
//! 6. Envelope widths reach the requested coverage

mod common;

use chrono::{Datelike, Days, NaiveDate};
use common::*;
use proptest::prelude::*;
use quotelab::domain::analytics::{
    self, AverageKind, BandParams, CoverageBy, EnvelopeQuery, ParabolicParams, Side, StopRequest,
    TrailingStop, wilder_atr, windowed_atr,
};
use quotelab::domain::indicator::{Ema, Indicator, Sma, Wma};
use quotelab::domain::quote_store::{QuoteStore, Window};
use quotelab::domain::series::Field;
use std::collections::BTreeMap;

// ── Strategies (proptest) ────────────────────────────────────────────

/// (day gap, low, range, open fraction, close fraction, volume)
type RawBar = (u64, f64, f64, f64, f64, f64);

fn arb_bar() -> impl Strategy<Value = RawBar> {
    (
        1u64..4,
        10.0..200.0_f64,
        0.0..10.0_f64,
        0.0..=1.0_f64,
        0.0..=1.0_f64,
        (0.0..10_000.0_f64).prop_map(f64::round),
    )
}

fn arb_quotes(max: usize) -> impl Strategy<Value = Vec<Quote>> {
    prop::collection::vec(arb_bar(), 1..max).prop_map(|bars| {
        let mut day = NaiveDate::from_ymd_opt(2023, 12, 28).unwrap();
        bars.into_iter()
            .map(|(gap, low, range, o, c, volume)| {
                day = day.checked_add_days(Days::new(gap)).unwrap();
                let high = low + range;
                Quote::new(day, low + range * o, high, low, low + range * c, volume)
            })
            .collect()
    })
}

fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Long), Just(Side::Short)]
}

fn week_key(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap()
}

fn month_key(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap()
}

fn check_buckets(
    daily: &[Quote],
    resampled: &QuoteStore,
    key: fn(NaiveDate) -> NaiveDate,
) -> Result<(), TestCaseError> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Quote>> = BTreeMap::new();
    for quote in daily {
        buckets.entry(key(quote.date)).or_default().push(*quote);
    }
    let merged = resampled.quotes();
    prop_assert_eq!(merged.len(), buckets.len());

    for (bar, members) in merged.iter().zip(buckets.values()) {
        let first = members[0];
        let last = members[members.len() - 1];
        prop_assert_eq!(bar.date, first.date);
        prop_assert_eq!(bar.open, first.open);
        prop_assert_eq!(bar.close, last.close);
        prop_assert_eq!(
            bar.high,
            members.iter().map(|q| q.high).fold(f64::NEG_INFINITY, f64::max)
        );
        prop_assert_eq!(
            bar.low,
            members.iter().map(|q| q.low).fold(f64::INFINITY, f64::min)
        );
        let volume: f64 = members.iter().map(|q| q.volume).sum();
        prop_assert!((bar.volume - volume).abs() < 1e-6);
    }
    Ok(())
}

fn assert_tightens(result: &TrailingStop, side: Side) -> Result<(), TestCaseError> {
    for pair in result.stops.windows(2) {
        match side {
            Side::Long => prop_assert!(pair[1] >= pair[0], "long stop loosened: {:?}", pair),
            Side::Short => prop_assert!(pair[1] <= pair[0], "short stop loosened: {:?}", pair),
        }
    }
    Ok(())
}

// ── 1. Resampling ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn weekly_buckets_aggregate_daily_bars(quotes in arb_quotes(60)) {
        let store = store_from("P", &quotes);
        check_buckets(&quotes, &store.weekly(), week_key)?;
    }

    #[test]
    fn monthly_buckets_aggregate_daily_bars(quotes in arb_quotes(90)) {
        let store = store_from("P", &quotes);
        check_buckets(&quotes, &store.monthly(), month_key)?;
    }
}

// ── 2. Dividend idempotence ──────────────────────────────────────────

proptest! {
    #[test]
    fn dividend_adjustment_without_dividends_is_identity(quotes in arb_quotes(40)) {
        let store = store_from("P", &quotes);
        let fields = [Field::Open, Field::High, Field::Low, Field::Close, Field::Volume];
        let plain: Vec<Vec<f64>> =
            fields.iter().map(|f| store.series(*f, Window::all(), false)).collect();
        store.set_apply_dividend(true);
        for (field, expected) in fields.iter().zip(plain.iter()) {
            prop_assert_eq!(&store.series(*field, Window::all(), false), expected);
        }
    }
}

// ── 3. Zero period ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn zero_period_averages_are_zero(values in prop::collection::vec(-1e6..1e6_f64, 1..50)) {
        for output in [
            Sma::new(0).first_series(&values),
            Ema::new(0).first_series(&values),
            Wma::new(0).first_series(&values),
        ] {
            prop_assert_eq!(output.len(), values.len());
            prop_assert!(output.iter().all(|v| *v == 0.0));
        }
    }
}

// ── 4. Constant ATR ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_series_has_zero_atr(
        price in 0.01..1e5_f64,
        len in 1usize..40,
        period in 1usize..20,
    ) {
        let flat = vec![price; len];
        prop_assert!(windowed_atr(&flat, &flat, &flat, period).iter().all(|v| *v == 0.0));
        prop_assert!(wilder_atr(&flat, &flat, &flat, period).iter().all(|v| *v == 0.0));
    }
}

// ── 5. Stop monotonicity ─────────────────────────────────────────────

proptest! {
    #[test]
    fn trailing_stops_only_tighten(
        quotes in arb_quotes(50),
        side in arb_side(),
        stop_offset in 0.0..50.0_f64,
        coefficient in 0.1..4.0_f64,
        period in 1usize..12,
    ) {
        let store = store_from("P", &quotes);
        let first_close = quotes[0].close;
        let stop_loss = match side {
            Side::Long => (first_close - stop_offset).max(0.5),
            Side::Short => first_close + stop_offset,
        };
        let request = StopRequest { start: None, end: None, stop_loss, side };
        let band = BandParams { coefficient, period };

        let parabolic = analytics::parabolic_stop(&store, &request, &ParabolicParams::default())
            .unwrap()
            .unwrap();
        assert_tightens(&parabolic, side)?;
        let safe_zone = analytics::safe_zone_stop(&store, &request, &band).unwrap().unwrap();
        assert_tightens(&safe_zone, side)?;
        let chandelier = analytics::chandelier_stop(&store, &request, &band).unwrap().unwrap();
        assert_tightens(&chandelier, side)?;

        prop_assert_eq!(parabolic.stops.len(), quotes.len());
    }
}

// ── 6. Envelope coverage ─────────────────────────────────────────────

proptest! {
    #[test]
    fn envelope_width_reaches_target(
        quotes in arb_quotes(60),
        period in 1usize..10,
        target in 0.05..=1.0_f64,
        by_bar in any::<bool>(),
        exponential in any::<bool>(),
    ) {
        let store = store_from("P", &quotes);
        let by = if by_bar { CoverageBy::ByBar } else { CoverageBy::ByPrice };
        let average = if exponential { AverageKind::Exponential } else { AverageKind::Simple };
        let query = EnvelopeQuery {
            count: quotes.len(),
            end: None,
            period,
            average,
            by,
            coverage: target,
            delta: 0.0001,
        };
        let result = analytics::envelope(&store, &query).unwrap().unwrap();

        let window = Window::last(quotes.len() + period, None);
        let closes = store.close(window, false);
        let ma = match average {
            AverageKind::Simple => Sma::new(period).first_series(&closes),
            AverageKind::Exponential => Ema::new(period).first_series(&closes),
        };
        let high = store.high(window, false);
        let low = store.low(window, false);
        let reached = analytics::coverage(&ma, &high, &low, period, result.value + query.delta, by);
        prop_assert!(reached >= target, "width {} reached {} < {}", result.value, reached, target);
    }
}
