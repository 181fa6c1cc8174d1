//! Error taxonomy of the rate pipeline

use crate::core::rate::FeedType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },
    #[error("Request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),
    #[error("Invalid feed format: {0}")]
    InvalidFeedFormat(String),
    #[error("Invalid feed date {value:?}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Invalid {field} {value:?} for {currency}")]
    InvalidRateValue {
        currency: String,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] fjall::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0} => Rate not found")]
    RateNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No URL configured for {feed} feed")]
    MissingFeedUrl { feed: FeedType },
    #[error("Failed to fetch {feed} feed")]
    Fetch {
        feed: FeedType,
        #[source]
        source: FetchError,
    },
    #[error("Failed to parse {feed} feed")]
    Parse {
        feed: FeedType,
        #[source]
        source: ParseError,
    },
    #[error("Failed to store rates")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Pipeline stage the error was raised in.
    pub fn stage(&self) -> &'static str {
        match self {
            SyncError::MissingFeedUrl { .. } => "config",
            SyncError::Fetch { .. } => "fetch",
            SyncError::Parse { .. } => "parse",
            SyncError::Store(_) => "store",
        }
    }

    pub fn feed(&self) -> Option<FeedType> {
        match self {
            SyncError::MissingFeedUrl { feed }
            | SyncError::Fetch { feed, .. }
            | SyncError::Parse { feed, .. } => Some(*feed),
            SyncError::Store(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_not_found_message_names_currency() {
        let err = LookupError::RateNotFound("KGHS".to_string());
        assert_eq!(err.to_string(), "KGHS => Rate not found");
    }

    #[test]
    fn test_sync_error_stage() {
        let err = SyncError::Parse {
            feed: FeedType::Weekly,
            source: ParseError::InvalidFeedFormat("missing Date attribute".to_string()),
        };
        assert_eq!(err.stage(), "parse");
        assert_eq!(err.feed(), Some(FeedType::Weekly));
        assert_eq!(err.to_string(), "Failed to parse WEEKLY feed");
    }
}
