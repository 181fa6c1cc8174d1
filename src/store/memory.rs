use super::stamp;
use crate::core::error::StoreError;
use crate::core::rate::{CurrencyCode, RateKey, RateRecord, StoredRate};
use crate::core::store::{RateStore, UpsertSummary};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct MemoryState {
    rates: HashMap<RateKey, StoredRate>,
    sequence: u64,
}

/// In-memory rate store. Batches are applied under a single write lock, so
/// readers see either none or all of a batch.
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    inner: Arc<RwLock<MemoryState>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn upsert_all(&self, records: &[RateRecord]) -> Result<UpsertSummary, StoreError> {
        let mut state = self.inner.write().await;
        let now = Utc::now();
        let sequence = state.sequence + 1;
        let mut summary = UpsertSummary {
            sequence,
            ..Default::default()
        };

        for record in records {
            let key = record.key();
            let stored = stamp(state.rates.get(&key), record, now, sequence);
            match state.rates.insert(key, stored) {
                Some(_) => summary.updated += 1,
                None => summary.inserted += 1,
            }
        }
        state.sequence = sequence;

        debug!(?summary, "Applied rate batch in memory");
        Ok(summary)
    }

    async fn find_latest(&self, code: &CurrencyCode) -> Result<Option<StoredRate>, StoreError> {
        let state = self.inner.read().await;
        let latest = state
            .rates
            .values()
            .filter(|stored| &stored.record.currency_code == code)
            .fold(None::<&StoredRate>, |best, candidate| match best {
                Some(best) if !candidate.is_newer_than(best) => Some(best),
                _ => Some(candidate),
            });
        Ok(latest.cloned())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().await.rates.len())
    }
}
