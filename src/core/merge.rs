//! Combines the records of both feeds into one write batch

use crate::core::rate::RateRecord;

/// Concatenates the DAILY and WEEKLY record sets, DAILY first.
///
/// Nothing is deduplicated: the feed type is part of the storage key, so the
/// same currency and date from both feeds are stored as two records. DAILY
/// precedence is applied when reading the current rate.
pub fn merge(daily: Vec<RateRecord>, weekly: Vec<RateRecord>) -> Vec<RateRecord> {
    let mut combined = daily;
    combined.extend(weekly);
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::FeedType;
    use chrono::NaiveDate;

    fn record(code: &str, feed_type: FeedType) -> RateRecord {
        RateRecord {
            currency_code: code.parse().unwrap(),
            exchange_date: NaiveDate::from_ymd_opt(2023, 8, 9).unwrap(),
            rate: 1.5,
            nominal: 1,
            feed_type,
        }
    }

    #[test]
    fn test_daily_comes_first() {
        let daily = vec![record("USD", FeedType::Daily), record("EUR", FeedType::Daily)];
        let weekly = vec![record("AMD", FeedType::Weekly), record("USD", FeedType::Weekly)];

        let merged = merge(daily, weekly);

        let order: Vec<_> = merged
            .iter()
            .map(|r| (r.currency_code.as_str(), r.feed_type))
            .collect();
        assert_eq!(
            order,
            vec![
                ("USD", FeedType::Daily),
                ("EUR", FeedType::Daily),
                ("AMD", FeedType::Weekly),
                ("USD", FeedType::Weekly),
            ]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge(vec![], vec![]).is_empty());
        assert_eq!(merge(vec![], vec![record("AMD", FeedType::Weekly)]).len(), 1);
    }
}
