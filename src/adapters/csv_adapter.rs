//! CSV file quote adapter.
//!
//! Quotes live in `{ticker}.csv` with a `Date,Open,High,Low,Close[,Volume]`
//! header, dividends in an optional `{ticker}_dividends.csv` with
//! `Date,Dividend`. Header names are matched case-insensitively, cells are
//! trimmed and lines starting with `#` are comments.

use crate::domain::error::QuotelabError;
use crate::domain::quote::Quote;
use crate::domain::store_config::DEFAULT_DATE_FORMAT;
use crate::ports::quote_port::{Dividend, QuotePort};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
    date_format: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_date_format(base_path, DEFAULT_DATE_FORMAT)
    }

    pub fn with_date_format(base_path: PathBuf, date_format: &str) -> Self {
        Self {
            base_path,
            date_format: date_format.to_string(),
        }
    }

    fn quotes_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}.csv"))
    }

    fn dividends_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}_dividends.csv"))
    }

    fn parse_date(&self, raw: &str, path: &Path, row: usize) -> Result<NaiveDate, QuotelabError> {
        NaiveDate::parse_from_str(raw, &self.date_format).map_err(|e| QuotelabError::DataLoad {
            reason: format!("{} row {row}: invalid date '{raw}': {e}", path.display()),
        })
    }
}

/// Column positions resolved from a header row.
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn require_column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize, QuotelabError> {
    find_column(headers, name).ok_or_else(|| QuotelabError::DataLoad {
        reason: format!("{}: missing {name} column", path.display()),
    })
}

fn read_file(path: &Path) -> Result<String, QuotelabError> {
    fs::read_to_string(path).map_err(|e| QuotelabError::DataLoad {
        reason: format!("failed to read {}: {e}", path.display()),
    })
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(content.as_bytes())
}

fn is_blank(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("null")
}

/// Parses a price cell; blank cells read as 0.0 so zero fixing can repair them.
fn parse_price(
    record: &StringRecord,
    index: usize,
    name: &str,
    path: &Path,
    row: usize,
) -> Result<f64, QuotelabError> {
    let raw = record.get(index).unwrap_or_default();
    if is_blank(raw) {
        return Ok(0.0);
    }
    let value: f64 = raw.parse().map_err(|e| QuotelabError::DataLoad {
        reason: format!("{} row {row}: invalid {name} '{raw}': {e}", path.display()),
    })?;
    check_value(value, raw, name, path, row)
}

/// Prices, volumes and dividends must be finite and non-negative.
fn check_value(
    value: f64,
    raw: &str,
    name: &str,
    path: &Path,
    row: usize,
) -> Result<f64, QuotelabError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(QuotelabError::DataLoad {
            reason: format!(
                "{} row {row}: {name} '{raw}' must be a finite non-negative number",
                path.display()
            ),
        })
    }
}

impl QuotePort for CsvAdapter {
    fn fetch_quotes(&self, ticker: &str) -> Result<Vec<Quote>, QuotelabError> {
        let path = self.quotes_path(ticker);
        let content = read_file(&path)?;
        let mut rdr = reader(&content);

        let headers = rdr
            .headers()
            .map_err(|e| QuotelabError::DataLoad {
                reason: format!("{}: CSV header error: {e}", path.display()),
            })?
            .clone();
        let columns = Columns {
            date: require_column(&headers, "Date", &path)?,
            open: require_column(&headers, "Open", &path)?,
            high: require_column(&headers, "High", &path)?,
            low: require_column(&headers, "Low", &path)?,
            close: require_column(&headers, "Close", &path)?,
            volume: find_column(&headers, "Volume"),
        };

        let mut quotes = Vec::new();
        let mut skipped = 0usize;
        for (i, result) in rdr.records().enumerate() {
            // header is row 1
            let row = i + 2;
            let record = result.map_err(|e| QuotelabError::DataLoad {
                reason: format!("{} row {row}: CSV parse error: {e}", path.display()),
            })?;

            let raw_open = record.get(columns.open).unwrap_or_default();
            let open = match raw_open.parse::<f64>() {
                Ok(v) if !is_blank(raw_open) => check_value(v, raw_open, "open", &path, row)?,
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let date = self.parse_date(record.get(columns.date).unwrap_or_default(), &path, row)?;
            let high = parse_price(&record, columns.high, "high", &path, row)?;
            let low = parse_price(&record, columns.low, "low", &path, row)?;
            let close = parse_price(&record, columns.close, "close", &path, row)?;
            let volume = match columns.volume {
                Some(index) => parse_price(&record, index, "volume", &path, row)?,
                None => 0.0,
            };
            quotes.push(Quote::new(date, open, high, low, close, volume));
        }

        quotes.sort_by_key(|q| q.date);
        debug!(ticker, rows = quotes.len(), skipped, "read quote file");
        Ok(quotes)
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<Dividend>, QuotelabError> {
        let path = self.dividends_path(ticker);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = read_file(&path)?;
        let mut rdr = reader(&content);

        let headers = rdr
            .headers()
            .map_err(|e| QuotelabError::DataLoad {
                reason: format!("{}: CSV header error: {e}", path.display()),
            })?
            .clone();
        let date_col = require_column(&headers, "Date", &path)?;
        let amount_col = require_column(&headers, "Dividend", &path)?;

        let mut dividends = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 2;
            let record = result.map_err(|e| QuotelabError::DataLoad {
                reason: format!("{} row {row}: CSV parse error: {e}", path.display()),
            })?;
            let raw_amount = record.get(amount_col).unwrap_or_default();
            if is_blank(raw_amount) {
                continue;
            }
            let date = self.parse_date(record.get(date_col).unwrap_or_default(), &path, row)?;
            let amount = parse_price(&record, amount_col, "dividend", &path, row)?;
            dividends.push(Dividend { date, amount });
        }

        dividends.sort_by_key(|d| d.date);
        Ok(dividends)
    }
}
