pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StorageKind};
use crate::core::rate::{RateRecord, StoredRate};
use crate::core::store::RateStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use disk::DiskRateStore;
use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::debug;

/// Opens the rate store selected by the configuration.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn RateStore>> {
    match config.storage {
        StorageKind::Memory => {
            debug!("Using in-memory rate store");
            Ok(Arc::new(MemoryRateStore::new()))
        }
        StorageKind::Disk => {
            let path = config.default_data_path()?.join("rates");
            let store = DiskRateStore::open(&path)
                .with_context(|| format!("Failed to open rate store at {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

/// Builds the stored form of `record`, keeping the creation time of an
/// existing entry for the same key.
pub(crate) fn stamp(
    existing: Option<&StoredRate>,
    record: &RateRecord,
    now: DateTime<Utc>,
    sequence: u64,
) -> StoredRate {
    StoredRate {
        record: record.clone(),
        created_at: existing.map_or(now, |stored| stored.created_at),
        updated_at: now,
        sequence,
    }
}
