use crate::core::rate::{CurrencyCode, FeedType};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_CURRENCY: &str = "KGS";
pub const DEFAULT_DAILY_URL: &str = "https://www.nbkr.kg/XML/daily.xml";
pub const DEFAULT_WEEKLY_URL: &str = "https://www.nbkr.kg/XML/weekly.xml";

/// Feed URLs keyed by feed type.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct FeedsConfig(BTreeMap<FeedType, String>);

impl FeedsConfig {
    pub fn new(daily: &str, weekly: &str) -> Self {
        FeedsConfig(BTreeMap::from([
            (FeedType::Daily, daily.to_string()),
            (FeedType::Weekly, weekly.to_string()),
        ]))
    }

    pub fn url_for(&self, feed: FeedType) -> Option<&str> {
        self.0.get(&feed).map(String::as_str)
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        FeedsConfig::new(DEFAULT_DAILY_URL, DEFAULT_WEEKLY_URL)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_interval_secs() -> u64 {
    3600
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Disk,
    Memory,
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::from_static(DEFAULT_BASE_CURRENCY)
}

fn default_currencies() -> Vec<String> {
    ["KGS", "RUB", "USD", "EUR", "KZT", "CNY"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,
    pub feeds: FeedsConfig,
    /// Currencies listed by the `rates` command when none are given.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub storage: StorageKind,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            base_currency: default_base_currency(),
            feeds: FeedsConfig::default(),
            currencies: default_currencies(),
            sync: SyncConfig::default(),
            storage: StorageKind::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("kg", "ratesync", "ratesync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("kg", "ratesync", "ratesync")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Every feed type needs a URL, and requests need a non-zero timeout.
    pub fn validate(&self) -> Result<()> {
        for feed in FeedType::ALL {
            if self.feeds.url_for(feed).is_none_or(|url| url.trim().is_empty()) {
                anyhow::bail!("Missing URL for {} feed", feed);
            }
        }
        if self.sync.request_timeout_secs == 0 {
            anyhow::bail!("sync.request_timeout_secs must be greater than 0");
        }
        Ok(())
    }
}
