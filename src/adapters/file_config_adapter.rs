//! INI file configuration adapter.

use crate::domain::error::QuotelabError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuotelabError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| QuotelabError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, QuotelabError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| QuotelabError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::store_config::{build_data_config, build_store_config};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[store]
ticker = MSFT
decimals = 3

[data]
dir = /srv/quotes
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(adapter.get_string("store", "ticker"), Some("MSFT".to_string()));
        assert_eq!(adapter.get_int("store", "decimals", 2), 3);
        assert_eq!(adapter.get_string("data", "dir"), Some("/srv/quotes".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[store]\ndecimals = 2\n").unwrap();
        assert_eq!(adapter.get_string("store", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn numeric_getters_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[store]\ndecimals = abc\nstep = tick\n").unwrap();
        assert_eq!(adapter.get_int("store", "decimals", 42), 42);
        assert_eq!(adapter.get_int("store", "missing", 7), 7);
        assert_eq!(adapter.get_double("store", "step", 0.5), 0.5);
        assert_eq!(adapter.get_double("store", "missing", 99.9), 99.9);
    }

    #[test]
    fn get_double_returns_value() {
        let adapter = FileConfigAdapter::from_string("[store]\nstep = 0.05\n").unwrap();
        assert_eq!(adapter.get_double("store", "step", 0.0), 0.05);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[store]\na = true\nb = YES\nc = 1\nd = off\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("store", "a", false));
        assert!(adapter.get_bool("store", "b", false));
        assert!(adapter.get_bool("store", "c", false));
        assert!(!adapter.get_bool("store", "d", true));
        assert!(!adapter.get_bool("store", "e", true));
        assert!(!adapter.get_bool("store", "f", true));
        assert!(adapter.get_bool("store", "missing", true));
    }

    #[test]
    fn from_file_feeds_store_config() {
        let file = create_temp_config(
            "[store]\nticker = BHP\napply_dividend = yes\nstep = 0.005\ndecimals = 3\n\
             [data]\ndate_format = %d/%m/%Y\n",
        );
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();

        let store = build_store_config(&adapter).unwrap();
        assert_eq!(store.ticker.as_deref(), Some("BHP"));
        assert!(store.apply_dividend);
        assert!(store.fix_zeros);
        assert_eq!(store.decimals, 3);
        assert_eq!(store.step, 0.005);

        let data = build_data_config(&adapter).unwrap();
        assert_eq!(data.date_format, "%d/%m/%Y");
    }

    #[test]
    fn from_file_returns_config_parse_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(QuotelabError::ConfigParse { .. })));
    }
}
