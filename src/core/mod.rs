//! Rate ingestion and lookup pipeline

pub mod config;
pub mod error;
pub mod fetcher;
pub mod log;
pub mod lookup;
pub mod merge;
pub mod parser;
pub mod rate;
pub mod store;
pub mod sync;

// Re-export main types for cleaner imports
pub use error::{FetchError, LookupError, ParseError, StoreError, SyncError};
pub use fetcher::FeedFetcher;
pub use lookup::RateLookupService;
pub use rate::{CurrencyCode, FeedType, RateRecord, StoredRate};
pub use store::{RateStore, UpsertSummary};
pub use sync::{RateSynchronizer, SyncReport};
