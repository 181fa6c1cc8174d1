pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::{RateLookupService, RateStore, RateSynchronizer};
use crate::providers::HttpFeedFetcher;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertDirection {
    ToBase,
    FromBase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Sync,
    Watch,
    Rates {
        codes: Vec<String>,
        sync_first: bool,
    },
    Convert {
        amount: f64,
        code: String,
        direction: ConvertDirection,
    },
}

/// The synchronizer and lookup service wired to one store.
pub struct RateApp {
    pub config: AppConfig,
    pub store: Arc<dyn RateStore>,
    pub synchronizer: RateSynchronizer,
    pub lookup: RateLookupService,
}

impl RateApp {
    pub fn new(config: AppConfig, store: Arc<dyn RateStore>) -> Result<Self> {
        let fetcher = Arc::new(HttpFeedFetcher::new(config.sync.request_timeout())?);
        let synchronizer = RateSynchronizer::new(
            fetcher,
            Arc::clone(&store),
            config.feeds.clone(),
            config.base_currency.clone(),
        );
        let lookup = RateLookupService::new(Arc::clone(&store), config.base_currency.clone());
        Ok(Self {
            config,
            store,
            synchronizer,
            lookup,
        })
    }

    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = store::open_store(&config)?;
        Self::new(config, store)
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratesync starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = RateApp::from_config(config)?;

    match command {
        AppCommand::Sync => cli::sync::run_once(&app).await,
        AppCommand::Watch => cli::sync::watch(&app).await,
        AppCommand::Rates { codes, sync_first } => {
            if sync_first {
                app.synchronizer.sync_to_db().await;
            }
            cli::rates::run(&app, &codes).await
        }
        AppCommand::Convert {
            amount,
            code,
            direction,
        } => cli::rates::convert(&app, amount, &code, direction).await,
    }
}
