//! Quote source port trait.

use crate::domain::error::QuotelabError;
use crate::domain::quote::Quote;
use chrono::NaiveDate;

/// A dividend paid on one date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Produces the raw daily bars and dividends of a ticker.
pub trait QuotePort {
    /// Daily quotes, in any order. Dividends are attached separately.
    fn fetch_quotes(&self, ticker: &str) -> Result<Vec<Quote>, QuotelabError>;

    /// Dividends paid; an instrument without a dividend history yields an
    /// empty list rather than an error.
    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<Dividend>, QuotelabError>;
}
