use crate::core::error::FetchError;
use crate::core::fetcher::FeedFetcher;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches feeds over HTTP. A single attempt per call; retrying is left to
/// the next scheduled sync.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ratesync/1.0")
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    #[instrument(name = "FeedFetch", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Requesting rate feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "Received rate feed");
        Ok(body.to_vec())
    }
}
