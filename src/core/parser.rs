//! Parses XML rate feeds into normalized rate records

use crate::core::error::ParseError;
use crate::core::rate::{CurrencyCode, FeedType, RateRecord};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

const FEED_DATE_FORMAT: &str = "%d.%m.%Y";

// The following structs mirror the feed layout:
// <CurrencyRates Date="09.08.2023"><Currency ISOCode="USD"><Nominal>1</Nominal><Value>87,8700</Value></Currency>...

/// `Currency` entries must be contiguous: an unrelated element between two
/// of them is reported by the deserializer as a duplicate field.
#[derive(Deserialize, Debug)]
struct XmlRateFeed {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Currency", default)]
    currencies: Vec<XmlCurrency>,
}

#[derive(Deserialize, Debug)]
struct XmlCurrency {
    #[serde(rename = "ISOCode")]
    iso_code: Option<String>,
    #[serde(rename = "Nominal")]
    nominal: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// Parses a raw feed document, stamping every record with `feed_type` and the
/// feed's `Date`. Records keep document order.
pub fn parse(raw: &[u8], feed_type: FeedType) -> Result<Vec<RateRecord>, ParseError> {
    let feed: XmlRateFeed = serde_xml_rs::from_reader(raw).map_err(|e| match e {
        serde_xml_rs::Error::Syntax { .. } => ParseError::MalformedFeed(e.to_string()),
        other => ParseError::InvalidFeedFormat(other.to_string()),
    })?;

    let date = feed
        .date
        .as_deref()
        .ok_or_else(|| ParseError::InvalidFeedFormat("missing Date attribute".to_string()))?;
    if feed.currencies.is_empty() {
        return Err(ParseError::InvalidFeedFormat(
            "missing Currency entries".to_string(),
        ));
    }
    let exchange_date = parse_feed_date(date)?;

    let records = feed
        .currencies
        .iter()
        .map(|entry| parse_entry(entry, exchange_date, feed_type))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        feed = %feed_type,
        %exchange_date,
        count = records.len(),
        "Parsed rate feed"
    );
    Ok(records)
}

fn parse_feed_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), FEED_DATE_FORMAT).map_err(|source| {
        ParseError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

fn parse_entry(
    entry: &XmlCurrency,
    exchange_date: NaiveDate,
    feed_type: FeedType,
) -> Result<RateRecord, ParseError> {
    let raw_code = entry
        .iso_code
        .as_deref()
        .ok_or_else(|| ParseError::InvalidFeedFormat("Currency without ISOCode".to_string()))?;
    let currency_code: CurrencyCode = raw_code
        .parse()
        .map_err(|e: anyhow::Error| ParseError::InvalidFeedFormat(e.to_string()))?;

    let field = |name: &'static str, value: &Option<String>| {
        value.clone().ok_or_else(|| {
            ParseError::InvalidFeedFormat(format!("Currency {currency_code} without {name}"))
        })
    };
    let nominal_text = field("Nominal", &entry.nominal)?;
    let value_text = field("Value", &entry.value)?;

    let nominal = parse_positive(&currency_code, "Nominal", &nominal_text)?.trunc();
    if nominal < 1.0 || nominal > f64::from(u32::MAX) {
        return Err(invalid_value(&currency_code, "Nominal", &nominal_text));
    }
    let rate = parse_positive(&currency_code, "Value", &value_text)?;

    Ok(RateRecord {
        currency_code,
        exchange_date,
        rate,
        nominal: nominal as u32,
        feed_type,
    })
}

/// Parses a locale-formatted decimal ("87,8700") that must be a finite,
/// strictly positive number.
fn parse_positive(
    currency: &CurrencyCode,
    field: &'static str,
    text: &str,
) -> Result<f64, ParseError> {
    let normalized = normalize_decimal(text);
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(invalid_value(currency, field, text)),
    }
}

fn normalize_decimal(text: &str) -> String {
    text.trim().replace(',', ".")
}

fn invalid_value(currency: &CurrencyCode, field: &'static str, text: &str) -> ParseError {
    ParseError::InvalidRateValue {
        currency: currency.to_string(),
        field,
        value: text.to_string(),
    }
}
