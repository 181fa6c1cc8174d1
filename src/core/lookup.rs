//! Current-rate queries against stored rates

use crate::core::error::LookupError;
use crate::core::rate::CurrencyCode;
use crate::core::store::RateStore;
use std::sync::Arc;
use tracing::debug;

pub struct RateLookupService {
    store: Arc<dyn RateStore>,
    base_currency: CurrencyCode,
}

impl RateLookupService {
    pub fn new(store: Arc<dyn RateStore>, base_currency: CurrencyCode) -> Self {
        Self {
            store,
            base_currency,
        }
    }

    pub fn base_currency(&self) -> &CurrencyCode {
        &self.base_currency
    }

    /// Price of one unit of `code` in the base currency, from the most
    /// recently synced record. The base currency itself is always 1.0.
    pub async fn get_current_rate(&self, code: &str) -> Result<f64, LookupError> {
        let requested = code.trim().to_ascii_uppercase();
        if self.base_currency == *requested {
            return Ok(1.0);
        }

        // A code that cannot be parsed was never stored.
        let currency: CurrencyCode = requested
            .parse()
            .map_err(|_| LookupError::RateNotFound(requested.clone()))?;

        let latest = self
            .store
            .find_latest(&currency)
            .await?
            .ok_or(LookupError::RateNotFound(requested))?;

        debug!(
            currency = %currency,
            exchange_date = %latest.record.exchange_date,
            feed = %latest.record.feed_type,
            "Resolved current rate"
        );
        Ok(latest.record.unit_rate())
    }

    /// Converts `amount` of `code` into the base currency.
    pub async fn to_base(&self, amount: f64, code: &str) -> Result<f64, LookupError> {
        Ok(amount * self.get_current_rate(code).await?)
    }

    /// Converts `amount` of base currency into `code`.
    pub async fn from_base(&self, amount: f64, code: &str) -> Result<f64, LookupError> {
        Ok(amount / self.get_current_rate(code).await?)
    }
}
