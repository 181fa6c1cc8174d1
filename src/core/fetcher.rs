//! Feed retrieval abstraction

use crate::core::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Retrieves the raw body served at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
