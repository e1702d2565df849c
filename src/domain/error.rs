//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quotelab.
#[derive(Debug, thiserror::Error)]
pub enum QuotelabError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("coverage {target} not reachable (last channel width tried {width})")]
    CoverageUnresolved { target: f64, width: f64 },

    #[error("data load error: {reason}")]
    DataLoad { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuotelabError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        QuotelabError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fails with [`QuotelabError::InvalidRange`] when both bounds are present and reversed.
pub fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), QuotelabError> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => Err(QuotelabError::InvalidRange { start, end }),
        _ => Ok(()),
    }
}

impl From<&QuotelabError> for std::process::ExitCode {
    fn from(err: &QuotelabError) -> Self {
        let code: u8 = match err {
            QuotelabError::Io(_) => 1,
            QuotelabError::ConfigParse { .. }
            | QuotelabError::ConfigMissing { .. }
            | QuotelabError::ConfigInvalid { .. } => 2,
            QuotelabError::DataLoad { .. } => 3,
            QuotelabError::InvalidParameter { .. }
            | QuotelabError::InvalidRange { .. }
            | QuotelabError::CoverageUnresolved { .. } => 4,
            QuotelabError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
