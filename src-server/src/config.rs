use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use grocery::StoreConfig;
use rolling_logger::LoggerOptions;
use tracing::{info, warn};

/// Where log files go. Read before the logger exists, so nothing here logs.
pub struct LogSettings {
    pub dir: PathBuf,
    pub max_files: usize,
}

impl LogSettings {
    pub fn load() -> Result<Self> {
        Ok(Self {
            dir: parse_var("GROCERY_LOG_DIR", "logs")?,
            max_files: parse_var("GROCERY_LOG_FILES", "7")?,
        })
    }

    pub fn options(&self, app_name: &str) -> LoggerOptions {
        let mut options = LoggerOptions::new(&self.dir, app_name);
        options.max_files = self.max_files;
        options
    }
}

pub struct Config {
    pub port: u16,
    pub log: LogSettings,
    /// Item and auth routes are only mounted when a store is configured
    pub store: Option<StoreConfig>,
}

impl Config {
    /// Load the remaining settings once logging is up.
    pub fn load(log: LogSettings) -> Result<Self> {
        info!(dir = %log.dir.display(), files = log.max_files, "Logging to files");
        Ok(Self {
            port: try_load("GROCERY_PORT", "5000")?,
            log,
            store: load_store(),
        })
    }
}

fn load_store() -> Option<StoreConfig> {
    StoreConfig::from_env()
        .map_err(|e| {
            warn!("Store not configured ({e}), serving health endpoint only");
        })
        .ok()
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    if env::var(key).is_err() {
        info!("{key} not set, using default: {default}");
    }
    parse_var(key, default)
}

fn parse_var<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
