//! Date-ordered quote store for one instrument.
//!
//! Writers take the exclusive side of an `RwLock` around a `BTreeMap`; readers
//! copy an ascending snapshot out under the shared side and compute on that.
//! Results reflect the map at snapshot time.

use crate::domain::indicator::{Ema, Hull, Indicator, Macd, MacdSeries, Sma, Wma};
use crate::domain::quote::Quote;
use crate::domain::rounding::{Direction, Rounding};
use crate::domain::series::{self, ExtractOptions, Field};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Immutable configuration of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub ticker: Option<String>,
    pub apply_dividend: bool,
    pub fix_zeros: bool,
    pub decimals: u32,
    pub step: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            ticker: None,
            apply_dividend: false,
            fix_zeros: true,
            decimals: 2,
            step: 0.01,
        }
    }
}

/// Which bars a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Every bar with `start <= date <= end`; a missing bound is open.
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// The last `count` bars at or before `end`.
    Last {
        count: usize,
        end: Option<NaiveDate>,
    },
}

impl Window {
    pub fn all() -> Self {
        Window::Range {
            start: None,
            end: None,
        }
    }

    pub fn range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Window::Range { start, end }
    }

    pub fn last(count: usize, end: Option<NaiveDate>) -> Self {
        Window::Last { count, end }
    }
}

#[derive(Debug)]
pub struct QuoteStore {
    ticker: Option<String>,
    decimals: u32,
    step: f64,
    apply_dividend: AtomicBool,
    fix_zeros: AtomicBool,
    quotes: RwLock<BTreeMap<NaiveDate, Quote>>,
}

impl Default for QuoteStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl QuoteStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            ticker: config.ticker,
            decimals: config.decimals,
            step: config.step,
            apply_dividend: AtomicBool::new(config.apply_dividend),
            fix_zeros: AtomicBool::new(config.fix_zeros),
            quotes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Current configuration, including the toggles.
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            ticker: self.ticker.clone(),
            apply_dividend: self.apply_dividend(),
            fix_zeros: self.fix_zeros(),
            decimals: self.decimals,
            step: self.step,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<NaiveDate, Quote>> {
        // A poisoned guard still holds a whole map: every mutation is a single insert.
        self.quotes.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<NaiveDate, Quote>> {
        self.quotes.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Inserts or replaces the quote at its date. Returns true if one was replaced.
    pub fn add(&self, quote: Quote) -> bool {
        trace!(date = %quote.date, close = quote.close, "add quote");
        self.write().insert(quote.date, quote).is_some()
    }

    pub fn add_bar(
        &self,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> bool {
        self.add(Quote::new(date, open, high, low, close, volume))
    }

    /// Attaches a dividend to the quote at `date`. Returns false if there is none.
    pub fn add_dividend(&self, date: NaiveDate, amount: f64) -> bool {
        let mut map = self.write();
        match map.get_mut(&date) {
            Some(quote) => {
                trace!(%date, amount, "add dividend");
                *quote = quote.with_dividend(amount);
                true
            }
            None => false,
        }
    }

    pub fn set_apply_dividend(&self, apply: bool) {
        self.apply_dividend.store(apply, Ordering::Relaxed);
    }

    pub fn set_fix_zeros(&self, fix: bool) {
        self.fix_zeros.store(fix, Ordering::Relaxed);
    }

    /// Adds every quote of `other` whose date is missing here. Existing dates
    /// are left untouched. Returns true if anything was added.
    pub fn merge(&self, other: &QuoteStore) -> bool {
        let incoming = other.quotes();
        let mut map = self.write();
        let mut added = false;
        for quote in incoming {
            if !map.contains_key(&quote.date) {
                map.insert(quote.date, quote);
                added = true;
            }
        }
        added
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn apply_dividend(&self) -> bool {
        self.apply_dividend.load(Ordering::Relaxed)
    }

    pub fn fix_zeros(&self) -> bool {
        self.fix_zeros.load(Ordering::Relaxed)
    }

    pub fn rounding(&self, direction: Direction) -> Rounding {
        Rounding {
            direction,
            decimals: self.decimals,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.read().keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.read().keys().next_back().copied()
    }

    pub fn first_quote(&self) -> Option<Quote> {
        self.read().values().next().copied()
    }

    pub fn last_quote(&self) -> Option<Quote> {
        self.read().values().next_back().copied()
    }

    pub fn get(&self, date: NaiveDate) -> Option<Quote> {
        self.read().get(&date).copied()
    }

    /// Ascending snapshot of every quote.
    pub fn quotes(&self) -> Vec<Quote> {
        self.read().values().copied().collect()
    }

    /// Ascending snapshot of the quotes in `window`.
    pub fn window(&self, window: Window) -> Vec<Quote> {
        let map = self.read();
        match window {
            Window::Range { start, end } => {
                if matches!((start, end), (Some(s), Some(e)) if s > e) {
                    return Vec::new();
                }
                let lower = start.unwrap_or(NaiveDate::MIN);
                let upper = end.unwrap_or(NaiveDate::MAX);
                map.range(lower..=upper).map(|(_, q)| *q).collect()
            }
            Window::Last { count, end } => {
                let upper = end.unwrap_or(NaiveDate::MAX);
                let mut tail: Vec<Quote> = map
                    .range(..=upper)
                    .rev()
                    .take(count)
                    .map(|(_, q)| *q)
                    .collect();
                tail.reverse();
                tail
            }
        }
    }

    pub(crate) fn extract_options(&self, reverse: bool) -> ExtractOptions {
        ExtractOptions {
            fix_zeros: self.fix_zeros(),
            apply_dividend: self.apply_dividend(),
            reverse,
        }
    }

    pub fn dates(&self, window: Window, reverse: bool) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.window(window).iter().map(|q| q.date).collect();
        if reverse {
            dates.reverse();
        }
        dates
    }

    /// Field values for `window` with zero-fill and dividend adjustment applied
    /// according to the store's toggles.
    pub fn series(&self, field: Field, window: Window, reverse: bool) -> Vec<f64> {
        series::extract(&self.window(window), field, self.extract_options(reverse))
    }

    pub fn open(&self, window: Window, reverse: bool) -> Vec<f64> {
        self.series(Field::Open, window, reverse)
    }

    pub fn high(&self, window: Window, reverse: bool) -> Vec<f64> {
        self.series(Field::High, window, reverse)
    }

    pub fn low(&self, window: Window, reverse: bool) -> Vec<f64> {
        self.series(Field::Low, window, reverse)
    }

    pub fn close(&self, window: Window, reverse: bool) -> Vec<f64> {
        self.series(Field::Close, window, reverse)
    }

    pub fn volume(&self, window: Window, reverse: bool) -> Vec<f64> {
        self.series(Field::Volume, window, reverse)
    }

    /// Primary series of `indicator` over the closes in `window`.
    ///
    /// The indicator always runs in date order; `reverse` flips its output.
    pub fn indicator(&self, indicator: &dyn Indicator, window: Window, reverse: bool) -> Vec<f64> {
        let mut out = indicator.first_series(&self.close(window, false));
        if reverse {
            out.reverse();
        }
        out
    }

    /// Every output series of `indicator` over the closes in `window`.
    pub fn indicator_all(
        &self,
        indicator: &dyn Indicator,
        window: Window,
        reverse: bool,
    ) -> Vec<Vec<f64>> {
        let mut all = indicator.all_series(&self.close(window, false));
        if reverse {
            all.iter_mut().for_each(|s| s.reverse());
        }
        all
    }

    pub fn simple_moving_average(&self, window: Window, period: usize, reverse: bool) -> Vec<f64> {
        self.indicator(&Sma::new(period), window, reverse)
    }

    pub fn exponential_moving_average(
        &self,
        window: Window,
        period: usize,
        reverse: bool,
    ) -> Vec<f64> {
        self.indicator(&Ema::new(period), window, reverse)
    }

    pub fn weighted_moving_average(
        &self,
        window: Window,
        period: usize,
        reverse: bool,
    ) -> Vec<f64> {
        self.indicator(&Wma::new(period), window, reverse)
    }

    pub fn hull_moving_average(&self, window: Window, period: usize, reverse: bool) -> Vec<f64> {
        self.indicator(&Hull::new(period), window, reverse)
    }

    pub fn macd(
        &self,
        window: Window,
        fast: usize,
        slow: usize,
        signal: usize,
        reverse: bool,
    ) -> MacdSeries {
        let mut series = Macd::new(fast, slow, signal).compute(&self.close(window, false));
        if reverse {
            series.line.reverse();
            series.signal.reverse();
            series.histogram.reverse();
        }
        series
    }

    fn derive(&self, quotes: impl IntoIterator<Item = Quote>) -> QuoteStore {
        let store = QuoteStore::new(self.config());
        {
            let mut map = store.write();
            for quote in quotes {
                map.insert(quote.date, quote);
            }
        }
        store
    }

    /// Buckets quotes by `key` and folds each bucket in date order with
    /// [`Quote::merge`].
    fn resample(&self, key: impl Fn(NaiveDate) -> NaiveDate) -> QuoteStore {
        let mut buckets: BTreeMap<NaiveDate, Quote> = BTreeMap::new();
        for quote in self.quotes() {
            buckets
                .entry(key(quote.date))
                .and_modify(|merged| *merged = merged.merge(&quote))
                .or_insert(quote);
        }
        self.derive(buckets.into_values())
    }

    /// One quote per calendar week (Monday start).
    pub fn weekly(&self) -> QuoteStore {
        self.resample(week_start)
    }

    /// One quote per calendar month.
    pub fn monthly(&self) -> QuoteStore {
        self.resample(|date| date.with_day(1).unwrap_or(date))
    }

    /// Independent store with the `count` most recent quotes strictly before `end`.
    pub fn sub_store_last(&self, count: usize, end: NaiveDate) -> QuoteStore {
        let picked: Vec<Quote> = self
            .read()
            .range(..end)
            .rev()
            .take(count)
            .map(|(_, q)| *q)
            .collect();
        self.derive(picked)
    }

    /// Independent store with the quotes in `start <= date < end`.
    pub fn sub_store_range(&self, start: NaiveDate, end: NaiveDate) -> QuoteStore {
        if start >= end {
            return self.derive(Vec::new());
        }
        let picked: Vec<Quote> = self.read().range(start..end).map(|(_, q)| *q).collect();
        self.derive(picked)
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}
