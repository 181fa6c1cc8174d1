use super::stamp;
use crate::core::error::StoreError;
use crate::core::rate::{CurrencyCode, RateKey, RateRecord, StoredRate};
use crate::core::store::{RateStore, UpsertSummary};
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const RATES_PARTITION: &str = "rates";
const META_PARTITION: &str = "meta";
const SEQUENCE_KEY: &str = "sequence";

/// fjall-backed rate store.
///
/// Records live in the `rates` partition under `CODE|YYYY-MM-DD|feed_code`
/// keys with JSON values. The batch sequence is kept in the `meta` partition
/// and committed in the same fjall batch as the records it stamps.
pub struct DiskRateStore {
    keyspace: Keyspace,
    rates: PartitionHandle,
    meta: PartitionHandle,
    write_lock: Mutex<()>,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let rates = keyspace.open_partition(RATES_PARTITION, PartitionCreateOptions::default())?;
        let meta = keyspace.open_partition(META_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened rate store at {}", path.display());

        Ok(Self {
            keyspace,
            rates,
            meta,
            write_lock: Mutex::new(()),
        })
    }

    fn current_sequence(&self) -> Result<u64, StoreError> {
        match self.meta.get(SEQUENCE_KEY)? {
            Some(value) => Ok(serde_json::from_slice(&value)?),
            None => Ok(0),
        }
    }

    fn read(&self, key: &str) -> Result<Option<StoredRate>, StoreError> {
        match self.rates.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn upsert_all(&self, records: &[RateRecord]) -> Result<UpsertSummary, StoreError> {
        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let sequence = self.current_sequence()? + 1;
        let mut summary = UpsertSummary {
            sequence,
            ..Default::default()
        };

        // Later duplicates in one batch overwrite earlier ones.
        let mut staged: HashMap<String, StoredRate> = HashMap::with_capacity(records.len());
        for record in records {
            let key = record.key().encode();
            let existing = match staged.get(&key) {
                Some(stored) => Some(stored.clone()),
                None => self.read(&key)?,
            };
            if existing.is_some() {
                summary.updated += 1;
            } else {
                summary.inserted += 1;
            }
            staged.insert(key, stamp(existing.as_ref(), record, now, sequence));
        }

        let mut batch = self.keyspace.batch();
        for (key, stored) in &staged {
            batch.insert(&self.rates, key.as_bytes(), serde_json::to_vec(stored)?);
        }
        batch.insert(
            &self.meta,
            SEQUENCE_KEY.as_bytes(),
            serde_json::to_vec(&sequence)?,
        );
        batch.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;

        debug!(?summary, "Committed rate batch");
        Ok(summary)
    }

    async fn find_latest(&self, code: &CurrencyCode) -> Result<Option<StoredRate>, StoreError> {
        let mut latest: Option<StoredRate> = None;
        for item in self.rates.prefix(RateKey::prefix(code)) {
            let (_, value) = item?;
            let candidate: StoredRate = serde_json::from_slice(&value)?;
            if latest
                .as_ref()
                .is_none_or(|best| candidate.is_newer_than(best))
            {
                latest = Some(candidate);
            }
        }
        Ok(latest)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rates.len()?)
    }
}
