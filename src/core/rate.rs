//! Exchange rate records and the types they are keyed by

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Publication cadence of a rate feed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    #[default]
    Daily,
    /// Low-liquidity currencies that are only published once a week.
    Weekly,
}

impl FeedType {
    pub const ALL: [FeedType; 2] = [FeedType::Daily, FeedType::Weekly];

    /// Small-integer code used in the persisted schema.
    pub fn code(&self) -> u8 {
        match self {
            FeedType::Daily => 0,
            FeedType::Weekly => 1,
        }
    }
}

impl Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FeedType::Daily => "DAILY",
                FeedType::Weekly => "WEEKLY",
            }
        )
    }
}

/// Three-letter ISO 4217 currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// For compile-time constants that are known to be valid codes.
    pub(crate) fn from_static(code: &'static str) -> Self {
        CurrencyCode(code.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!("Invalid currency code: {:?}", s);
        }
        Ok(CurrencyCode(code.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CurrencyCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A published rate: `rate` units of base currency buy `nominal` units of
/// `currency_code` on `exchange_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub currency_code: CurrencyCode,
    pub exchange_date: NaiveDate,
    pub rate: f64,
    pub nominal: u32,
    #[serde(default, with = "feed_type_code")]
    pub feed_type: FeedType,
}

impl RateRecord {
    /// Rate for a single unit of the currency.
    pub fn unit_rate(&self) -> f64 {
        self.rate / f64::from(self.nominal)
    }

    pub fn key(&self) -> RateKey {
        RateKey {
            currency_code: self.currency_code.clone(),
            exchange_date: self.exchange_date,
            feed_type: self.feed_type,
        }
    }
}

/// Uniqueness key of a stored rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct RateKey {
    pub currency_code: CurrencyCode,
    pub exchange_date: NaiveDate,
    pub feed_type: FeedType,
}

impl RateKey {
    /// Byte key prefix shared by every record of one currency.
    pub fn prefix(code: &CurrencyCode) -> String {
        format!("{code}|")
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{}|{}",
            Self::prefix(&self.currency_code),
            self.exchange_date.format("%Y-%m-%d"),
            self.feed_type.code()
        )
    }
}

/// A rate record as persisted, with its write bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRate {
    #[serde(flatten)]
    pub record: RateRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Sequence number of the batch that last wrote this record.
    pub sequence: u64,
}

impl StoredRate {
    /// Orders candidates for "current rate": most recent write first, DAILY
    /// before WEEKLY within a batch, then the later exchange date.
    pub fn is_newer_than(&self, other: &StoredRate) -> bool {
        let rank = |s: &StoredRate| {
            (
                s.sequence,
                std::cmp::Reverse(s.record.feed_type),
                s.record.exchange_date,
            )
        };
        rank(self) > rank(other)
    }
}

mod feed_type_code {
    use super::FeedType;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(feed_type: &FeedType, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(feed_type.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FeedType, D::Error> {
        match u8::deserialize(d)? {
            0 => Ok(FeedType::Daily),
            1 => Ok(FeedType::Weekly),
            other => Err(serde::de::Error::custom(format!(
                "unknown feed type code: {other}"
            ))),
        }
    }
}
