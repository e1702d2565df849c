#![allow(dead_code)]

use chrono::{Days, NaiveDate};
pub use quotelab::domain::quote::Quote;
use quotelab::domain::error::QuotelabError;
use quotelab::domain::quote_store::{QuoteStore, StoreConfig};
use quotelab::ports::quote_port::{Dividend, QuotePort};
use std::collections::HashMap;

pub struct MockQuotePort {
    pub quotes: HashMap<String, Vec<Quote>>,
    pub dividends: HashMap<String, Vec<Dividend>>,
    pub errors: HashMap<String, String>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            dividends: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_quotes(mut self, ticker: &str, quotes: Vec<Quote>) -> Self {
        self.quotes.insert(ticker.to_string(), quotes);
        self
    }

    pub fn with_dividend(mut self, ticker: &str, date: NaiveDate, amount: f64) -> Self {
        self.dividends
            .entry(ticker.to_string())
            .or_default()
            .push(Dividend { date, amount });
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl QuotePort for MockQuotePort {
    fn fetch_quotes(&self, ticker: &str) -> Result<Vec<Quote>, QuotelabError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(QuotelabError::DataLoad {
                reason: reason.clone(),
            });
        }
        Ok(self.quotes.get(ticker).cloned().unwrap_or_default())
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<Dividend>, QuotelabError> {
        Ok(self.dividends.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Consecutive calendar days starting at `start`.
pub fn day(start: &str, offset: u64) -> NaiveDate {
    date(start).checked_add_days(Days::new(offset)).unwrap()
}

pub fn make_quote(date_str: &str, open: f64, high: f64, low: f64, close: f64) -> Quote {
    Quote::new(date(date_str), open, high, low, close, 1_000.0)
}

/// Bars rising by `step` per day with a 1.0 high/low spread around the close.
pub fn trending_quotes(start: &str, n: usize, base: f64, step: f64) -> Vec<Quote> {
    (0..n)
        .map(|i| {
            let close = base + step * i as f64;
            let open = close - step / 2.0;
            Quote::new(
                day(start, i as u64),
                open,
                close.max(open) + 0.5,
                close.min(open) - 0.5,
                close,
                1_000.0 + i as f64,
            )
        })
        .collect()
}

pub fn store_from(ticker: &str, quotes: &[Quote]) -> QuoteStore {
    let store = QuoteStore::new(StoreConfig {
        ticker: Some(ticker.to_string()),
        ..StoreConfig::default()
    });
    for quote in quotes {
        store.add(*quote);
    }
    store
}

/// Writes `{ticker}.csv` into `dir` from `quotes`.
pub fn write_quote_csv(dir: &std::path::Path, ticker: &str, quotes: &[Quote]) {
    let mut content = String::from("Date,Open,High,Low,Close,Volume\n");
    for q in quotes {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            q.date, q.open, q.high, q.low, q.close, q.volume
        ));
    }
    std::fs::write(dir.join(format!("{ticker}.csv")), content).unwrap();
}
