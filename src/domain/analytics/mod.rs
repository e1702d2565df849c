//! Analytics over a quote store: envelope search, gap statistics, average
//! true range and trailing stops.
//!
//! Each report embeds a [`Span`] describing the query and the days actually
//! found. Preconditions are checked before any data is read; a window with no
//! bars yields `Ok(None)`.

pub mod atr;
pub mod envelope;
pub mod gap;
pub mod trailing_stop;

pub use atr::{AtrMethod, AverageTrueRange, average_true_range, wilder_atr, windowed_atr};
pub use envelope::{
    AverageKind, CoverageBy, Envelope, EnvelopeQuery, coverage, envelope,
};
pub use gap::{Gap, GapSide, gap};
pub use trailing_stop::{
    BandParams, ParabolicParams, StopExit, StopRequest, TrailingStop, average_penetration,
    chandelier_stop, exit_fill, parabolic_stop, safe_zone_stop,
};

use crate::domain::quote_store::{QuoteStore, Window};
use crate::domain::series::{self, Field};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Query bounds and the first/last days actually found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub ticker: Option<String>,
    pub count: usize,
    pub start_at: Option<NaiveDate>,
    pub end_at: Option<NaiveDate>,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

/// Position direction a trailing stop protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    #[default]
    Long,
    Short,
}

impl Side {
    pub fn is_short(self) -> bool {
        self == Side::Short
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("long"),
            Side::Short => f.write_str("short"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Side::Long),
            "short" | "sell" => Ok(Side::Short),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

/// Field columns of one consistent snapshot, adjusted per the store toggles.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bars {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl Bars {
    pub(crate) fn load(store: &QuoteStore, window: Window) -> Self {
        let quotes = store.window(window);
        let options = store.extract_options(false);
        Self {
            dates: quotes.iter().map(|q| q.date).collect(),
            open: series::extract(&quotes, Field::Open, options),
            high: series::extract(&quotes, Field::High, options),
            low: series::extract(&quotes, Field::Low, options),
            close: series::extract(&quotes, Field::Close, options),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.dates.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parse() {
        assert_eq!("Long".parse::<Side>().unwrap(), Side::Long);
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Short);
        assert!("flat".parse::<Side>().is_err());
        assert_eq!(Side::Short.to_string(), "short");
        assert!(Side::Short.is_short());
        assert_eq!(Side::default(), Side::Long);
    }
}
