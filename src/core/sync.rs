//! Fetch, parse, merge and persist both rate feeds as one unit

use crate::core::config::FeedsConfig;
use crate::core::error::SyncError;
use crate::core::fetcher::FeedFetcher;
use crate::core::merge::merge;
use crate::core::parser;
use crate::core::rate::{CurrencyCode, FeedType, RateRecord};
use crate::core::store::{RateStore, UpsertSummary};
use futures::future::try_join;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub daily: usize,
    pub weekly: usize,
    /// Base currency entries that were dropped before storing.
    pub skipped: usize,
    pub summary: UpsertSummary,
}

pub struct RateSynchronizer {
    fetcher: Arc<dyn FeedFetcher>,
    store: Arc<dyn RateStore>,
    feeds: FeedsConfig,
    base_currency: CurrencyCode,
    running: Mutex<()>,
}

impl RateSynchronizer {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        store: Arc<dyn RateStore>,
        feeds: FeedsConfig,
        base_currency: CurrencyCode,
    ) -> Self {
        Self {
            fetcher,
            store,
            feeds,
            base_currency,
            running: Mutex::new(()),
        }
    }

    /// Runs one sync and contains any failure: the error is logged and the
    /// previously stored rates stay untouched until the next run.
    pub async fn sync_to_db(&self) {
        match self.try_sync().await {
            Ok(report) => info!(
                daily = report.daily,
                weekly = report.weekly,
                inserted = report.summary.inserted,
                updated = report.summary.updated,
                "Currency rates synchronized"
            ),
            Err(e) => error!(
                stage = e.stage(),
                feed = ?e.feed(),
                error = %e,
                cause = %error_chain(&e),
                "Error while synchronizing currency rates"
            ),
        }
    }

    /// Runs one sync and reports its outcome. Concurrent calls are serialized.
    pub async fn try_sync(&self) -> Result<SyncReport, SyncError> {
        let _running = self.running.lock().await;

        let (daily, weekly) = try_join(
            self.load_feed(FeedType::Daily),
            self.load_feed(FeedType::Weekly),
        )
        .await?;

        let mut report = SyncReport {
            daily: daily.len(),
            weekly: weekly.len(),
            ..Default::default()
        };

        let mut records = merge(daily, weekly);
        let before = records.len();
        records.retain(|record| record.currency_code != self.base_currency);
        report.skipped = before - records.len();
        if report.skipped > 0 {
            warn!(
                base = %self.base_currency,
                count = report.skipped,
                "Dropped base currency entries from feed"
            );
        }

        report.summary = self.store.upsert_all(&records).await?;
        Ok(report)
    }

    async fn load_feed(&self, feed: FeedType) -> Result<Vec<RateRecord>, SyncError> {
        let url = self
            .feeds
            .url_for(feed)
            .ok_or(SyncError::MissingFeedUrl { feed })?;
        debug!(%feed, url, "Loading rate feed");

        let raw = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| SyncError::Fetch { feed, source })?;
        parser::parse(&raw, feed).map_err(|source| SyncError::Parse { feed, source })
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}
