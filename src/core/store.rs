//! Rate persistence abstraction

use crate::core::error::StoreError;
use crate::core::rate::{CurrencyCode, RateRecord, StoredRate};
use async_trait::async_trait;

/// Outcome of one committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub sequence: u64,
}

#[async_trait]
pub trait RateStore: Send + Sync {
    /// Inserts or overwrites every record, keyed by currency, exchange date
    /// and feed type. Either the whole batch is applied or none of it.
    async fn upsert_all(&self, records: &[RateRecord]) -> Result<UpsertSummary, StoreError>;

    /// Most recently written record for `code`, regardless of its exchange date.
    async fn find_latest(&self, code: &CurrencyCode) -> Result<Option<StoredRate>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
