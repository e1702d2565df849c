//! Store configuration building and validation.
//!
//! Reads the `[store]` and `[data]` sections, validating every field before
//! a store is created.

use crate::domain::error::QuotelabError;
use crate::domain::quote_store::StoreConfig;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const STORE_SECTION: &str = "store";
pub const DATA_SECTION: &str = "data";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_DECIMALS: i64 = 12;

/// Where and how quote files are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub dir: Option<PathBuf>,
    pub date_format: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

pub fn build_store_config(config: &dyn ConfigPort) -> Result<StoreConfig, QuotelabError> {
    let defaults = StoreConfig::default();
    Ok(StoreConfig {
        ticker: read_ticker(config)?,
        apply_dividend: read_bool(config, "apply_dividend", defaults.apply_dividend)?,
        fix_zeros: read_bool(config, "fix_zeros", defaults.fix_zeros)?,
        decimals: read_decimals(config, defaults.decimals)?,
        step: read_step(config, defaults.step)?,
    })
}

pub fn build_data_config(config: &dyn ConfigPort) -> Result<DataConfig, QuotelabError> {
    let dir = config
        .get_string(DATA_SECTION, "dir")
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);
    let date_format = config
        .get_string(DATA_SECTION, "date_format")
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
    validate_date_format(&date_format)?;
    Ok(DataConfig { dir, date_format })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuotelabError {
    QuotelabError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_ticker(config: &dyn ConfigPort) -> Result<Option<String>, QuotelabError> {
    let Some(raw) = config.get_string(STORE_SECTION, "ticker") else {
        return Ok(None);
    };
    let ticker = raw.trim();
    if ticker.is_empty() {
        return Ok(None);
    }
    if ticker.contains(['/', '\\']) || ticker.chars().any(char::is_whitespace) {
        return Err(invalid(
            STORE_SECTION,
            "ticker",
            "ticker must not contain whitespace or path separators",
        ));
    }
    Ok(Some(ticker.to_string()))
}

fn read_bool(config: &dyn ConfigPort, key: &str, default: bool) -> Result<bool, QuotelabError> {
    if config.get_string(STORE_SECTION, key).is_none() {
        return Ok(default);
    }
    // Both defaults disagree only when the value does not parse.
    let as_true = config.get_bool(STORE_SECTION, key, true);
    let as_false = config.get_bool(STORE_SECTION, key, false);
    if as_true != as_false {
        return Err(invalid(STORE_SECTION, key, format!("{key} must be true or false")));
    }
    Ok(as_true)
}

fn read_decimals(config: &dyn ConfigPort, default: u32) -> Result<u32, QuotelabError> {
    if config.get_string(STORE_SECTION, "decimals").is_none() {
        return Ok(default);
    }
    let value = config.get_int(STORE_SECTION, "decimals", -1);
    if !(0..=MAX_DECIMALS).contains(&value) {
        return Err(invalid(
            STORE_SECTION,
            "decimals",
            format!("decimals must be between 0 and {MAX_DECIMALS}"),
        ));
    }
    u32::try_from(value).map_err(|e| invalid(STORE_SECTION, "decimals", e.to_string()))
}

fn read_step(config: &dyn ConfigPort, default: f64) -> Result<f64, QuotelabError> {
    if config.get_string(STORE_SECTION, "step").is_none() {
        return Ok(default);
    }
    let value = config.get_double(STORE_SECTION, "step", f64::NAN);
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(STORE_SECTION, "step", "step must be positive"));
    }
    Ok(value)
}

fn validate_date_format(format: &str) -> Result<(), QuotelabError> {
    let probe = NaiveDate::from_ymd_opt(2001, 2, 3).ok_or_else(|| {
        invalid(DATA_SECTION, "date_format", "cannot build probe date")
    })?;
    let rendered = probe.format(format).to_string();
    match NaiveDate::parse_from_str(&rendered, format) {
        Ok(parsed) if parsed == probe => Ok(()),
        _ => Err(invalid(
            DATA_SECTION,
            "date_format",
            format!("'{format}' does not round-trip a calendar date"),
        )),
    }
}
