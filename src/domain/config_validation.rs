//! Configuration validation and resolved settings.
//!
//! Every key is optional. Present keys must parse; absent keys take the
//! defaults below.

use crate::domain::error::StockdeskError;
use crate::domain::market::DEFAULT_MARKET_SEED;
use crate::domain::timeline::{clamp_day_window, DEFAULT_DAY_WINDOW};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 12;
pub const DEFAULT_POOL_SIZE: u32 = 4;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    validate_seed(config)?;
    validate_feed_timeout(config)?;
    validate_days(config)?;
    validate_pool_size(config)?;
    validate_paths(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> StockdeskError {
    StockdeskError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Integer value of a present key; blank counts as absent.
fn optional_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<i64>, StockdeskError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| invalid(section, key, &format!("{key} must be an integer"))),
    }
}

fn validate_seed(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    if let Some(seed) = optional_int(config, "market", "seed")? {
        if u32::try_from(seed).is_err() {
            return Err(invalid(
                "market",
                "seed",
                "seed must be between 0 and 4294967295",
            ));
        }
    }
    Ok(())
}

fn validate_feed_timeout(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    if let Some(secs) = optional_int(config, "market", "feed_timeout_secs")? {
        if secs <= 0 {
            return Err(invalid(
                "market",
                "feed_timeout_secs",
                "feed_timeout_secs must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_days(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    optional_int(config, "simulation", "days")?;
    Ok(())
}

fn validate_pool_size(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    if let Some(size) = optional_int(config, "sqlite", "pool_size")? {
        if size < 1 {
            return Err(invalid("sqlite", "pool_size", "pool_size must be at least 1"));
        }
    }
    Ok(())
}

fn validate_paths(config: &dyn ConfigPort) -> Result<(), StockdeskError> {
    for (section, key) in [
        ("market", "feed_path"),
        ("universe", "csv_path"),
        ("sqlite", "path"),
    ] {
        if let Some(raw) = config.get_string(section, key) {
            if raw.trim().is_empty() {
                return Err(invalid(section, key, &format!("{key} must not be empty")));
            }
        }
    }
    Ok(())
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub market_seed: u32,
    pub feed_path: Option<PathBuf>,
    pub feed_timeout: Duration,
    pub day_window: u32,
    pub universe_csv: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub sqlite_pool_size: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            market_seed: DEFAULT_MARKET_SEED,
            feed_path: None,
            feed_timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS),
            day_window: DEFAULT_DAY_WINDOW,
            universe_csv: None,
            sqlite_path: None,
            sqlite_pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl AppSettings {
    /// Validate, then resolve with defaults for absent keys.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockdeskError> {
        validate_config(config)?;
        let defaults = Self::default();
        let market_seed = optional_int(config, "market", "seed")?
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(defaults.market_seed);
        let feed_timeout = optional_int(config, "market", "feed_timeout_secs")?
            .and_then(|s| u64::try_from(s).ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.feed_timeout);
        let day_window = optional_int(config, "simulation", "days")?
            .map(|d| clamp_day_window(d.clamp(0, i64::from(u32::MAX)) as u32))
            .unwrap_or(defaults.day_window);
        let sqlite_pool_size = optional_int(config, "sqlite", "pool_size")?
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(defaults.sqlite_pool_size);

        Ok(Self {
            market_seed,
            feed_path: config.get_path("market", "feed_path"),
            feed_timeout,
            day_window,
            universe_csv: config.get_path("universe", "csv_path"),
            sqlite_path: config.get_path("sqlite", "path"),
            sqlite_pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_resolves_to_defaults() {
        let settings = AppSettings::from_config(&make_config("")).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.market_seed, 1_234_567);
        assert_eq!(settings.feed_timeout, Duration::from_secs(12));
        assert_eq!(settings.day_window, 60);
        assert_eq!(settings.sqlite_pool_size, 4);
    }

    #[test]
    fn full_config_resolves() {
        let config = make_config(
            r#"
[market]
seed = 42
feed_path = /tmp/feed.json
feed_timeout_secs = 3

[simulation]
days = 90

[universe]
csv_path = data/stocks.csv

[sqlite]
path = stockdesk.db
pool_size = 2
"#,
        );
        let s = AppSettings::from_config(&config).unwrap();
        assert_eq!(s.market_seed, 42);
        assert_eq!(s.feed_path, Some(PathBuf::from("/tmp/feed.json")));
        assert_eq!(s.feed_timeout, Duration::from_secs(3));
        assert_eq!(s.day_window, 90);
        assert_eq!(s.universe_csv, Some(PathBuf::from("data/stocks.csv")));
        assert_eq!(s.sqlite_path, Some(PathBuf::from("stockdesk.db")));
        assert_eq!(s.sqlite_pool_size, 2);
    }

    #[test]
    fn days_are_clamped_not_rejected() {
        let s = AppSettings::from_config(&make_config("[simulation]\ndays = 5\n")).unwrap();
        assert_eq!(s.day_window, 20);
        let s = AppSettings::from_config(&make_config("[simulation]\ndays = 999\n")).unwrap();
        assert_eq!(s.day_window, 120);
        let s = AppSettings::from_config(&make_config("[simulation]\ndays = -3\n")).unwrap();
        assert_eq!(s.day_window, 20);
    }

    #[test]
    fn non_integer_days_fail() {
        let err = validate_config(&make_config("[simulation]\ndays = sixty\n")).unwrap_err();
        assert!(matches!(err, StockdeskError::ConfigInvalid { key, .. } if key == "days"));
    }

    #[test]
    fn seed_out_of_range_fails() {
        let err = validate_config(&make_config("[market]\nseed = 4294967296\n")).unwrap_err();
        assert!(matches!(err, StockdeskError::ConfigInvalid { key, .. } if key == "seed"));
        let err = validate_config(&make_config("[market]\nseed = -1\n")).unwrap_err();
        assert!(matches!(err, StockdeskError::ConfigInvalid { key, .. } if key == "seed"));
    }

    #[test]
    fn seed_at_upper_bound_passes() {
        let s = AppSettings::from_config(&make_config("[market]\nseed = 4294967295\n")).unwrap();
        assert_eq!(s.market_seed, u32::MAX);
    }

    #[test]
    fn zero_timeout_fails() {
        let err =
            validate_config(&make_config("[market]\nfeed_timeout_secs = 0\n")).unwrap_err();
        assert!(
            matches!(err, StockdeskError::ConfigInvalid { key, .. } if key == "feed_timeout_secs")
        );
    }

    #[test]
    fn zero_pool_size_fails() {
        let err = validate_config(&make_config("[sqlite]\npool_size = 0\n")).unwrap_err();
        assert!(matches!(err, StockdeskError::ConfigInvalid { key, .. } if key == "pool_size"));
    }

    #[test]
    fn error_names_section() {
        let err = validate_config(&make_config("[sqlite]\npool_size = x\n")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config value [sqlite] pool_size: pool_size must be an integer"
        );
    }
}
