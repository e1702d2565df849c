//! Populates a quote store from a [`QuotePort`].

use crate::domain::error::QuotelabError;
use crate::domain::quote_store::{QuoteStore, StoreConfig};
use crate::ports::quote_port::QuotePort;
use tracing::{info, warn};

/// Builds a store for `config.ticker` with every quote and dividend the port has.
///
/// Dividends dated on a day without a quote are skipped with a warning.
pub fn load_store(port: &dyn QuotePort, config: StoreConfig) -> Result<QuoteStore, QuotelabError> {
    let ticker = config
        .ticker
        .clone()
        .ok_or_else(|| QuotelabError::ConfigMissing {
            section: "store".to_string(),
            key: "ticker".to_string(),
        })?;

    let quotes = port.fetch_quotes(&ticker)?;
    if quotes.is_empty() {
        return Err(QuotelabError::NoData { ticker });
    }

    let store = QuoteStore::new(config);
    let mut replaced = 0usize;
    for quote in quotes {
        if store.add(quote) {
            replaced += 1;
        }
    }
    if replaced > 0 {
        warn!(%ticker, replaced, "duplicate dates replaced by later rows");
    }

    let dividends = port.fetch_dividends(&ticker)?;
    let mut attached = 0usize;
    for dividend in &dividends {
        if store.add_dividend(dividend.date, dividend.amount) {
            attached += 1;
        } else {
            warn!(%ticker, date = %dividend.date, "dividend on a day without a quote skipped");
        }
    }

    info!(
        %ticker,
        quotes = store.len(),
        dividends = attached,
        "loaded quote store"
    );
    Ok(store)
}
