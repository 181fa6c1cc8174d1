use super::ui;
use crate::core::{LookupError, RateLookupService};
use crate::{ConvertDirection, RateApp};
use anyhow::Result;
use comfy_table::Cell;

/// Current rate of one requested currency.
#[derive(Debug)]
pub struct RateRow {
    pub code: String,
    pub rate: Result<f64, LookupError>,
}

/// Resolves each code independently; a missing rate does not stop the others.
pub async fn current_rates(lookup: &RateLookupService, codes: &[String]) -> Vec<RateRow> {
    let mut rows = Vec::with_capacity(codes.len());
    for code in codes {
        let code = code.trim().to_ascii_uppercase();
        let rate = lookup.get_current_rate(&code).await;
        rows.push(RateRow { code, rate });
    }
    rows
}

pub fn display_rates(rows: &[RateRow], base_currency: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate ({base_currency})")),
    ]);

    for row in rows {
        let rate = match &row.rate {
            Ok(rate) => ui::rate_cell(*rate),
            Err(LookupError::RateNotFound(_)) => ui::missing_cell("Rate not found"),
            Err(e) => ui::missing_cell(&e.to_string()),
        };
        table.add_row(vec![Cell::new(&row.code), rate]);
    }

    format!(
        "{}\n\n{}\n{}",
        ui::style_text("Current exchange rates", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("Rates per 1 unit of currency in {base_currency}"),
            ui::StyleType::Subtle
        )
    )
}

pub async fn run(app: &RateApp, codes: &[String]) -> Result<()> {
    let codes = if codes.is_empty() {
        &app.config.currencies
    } else {
        codes
    };

    let rows = current_rates(&app.lookup, codes).await;
    println!(
        "{}",
        display_rates(&rows, app.lookup.base_currency().as_str())
    );
    Ok(())
}

pub async fn convert(
    app: &RateApp,
    amount: f64,
    code: &str,
    direction: ConvertDirection,
) -> Result<()> {
    let base = app.lookup.base_currency().as_str();
    let code = code.trim().to_ascii_uppercase();

    let (converted, from, to) = match direction {
        ConvertDirection::ToBase => (app.lookup.to_base(amount, &code).await?, code.as_str(), base),
        ConvertDirection::FromBase => {
            (app.lookup.from_base(amount, &code).await?, base, code.as_str())
        }
    };

    println!(
        "{amount:.2} {from} = {} {to}",
        ui::style_text(&format!("{converted:.4}"), ui::StyleType::Value)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::{FeedType, RateRecord};
    use crate::core::store::RateStore;
    use crate::store::memory::MemoryRateStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn lookup() -> RateLookupService {
        let store = Arc::new(MemoryRateStore::new());
        store
            .upsert_all(&[RateRecord {
                currency_code: "USD".parse().unwrap(),
                exchange_date: NaiveDate::from_ymd_opt(2023, 8, 9).unwrap(),
                rate: 87.87,
                nominal: 1,
                feed_type: FeedType::Daily,
            }])
            .await
            .unwrap();
        RateLookupService::new(store, "KGS".parse().unwrap())
    }

    #[tokio::test]
    async fn test_current_rates_keeps_going_after_missing() {
        let lookup = lookup().await;
        let codes: Vec<String> = ["kgs", "KGHS", "USD"].iter().map(|c| c.to_string()).collect();

        let rows = current_rates(&lookup, &codes).await;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].code, "KGS");
        assert_eq!(rows[0].rate.as_ref().unwrap(), &1.0);
        assert!(matches!(rows[1].rate, Err(LookupError::RateNotFound(_))));
        assert_eq!(rows[2].rate.as_ref().unwrap(), &87.87);
    }

    #[tokio::test]
    async fn test_display_rates() {
        let lookup = lookup().await;
        let codes = vec!["USD".to_string(), "KGHS".to_string()];
        let rows = current_rates(&lookup, &codes).await;

        let output = display_rates(&rows, "KGS");
        assert!(output.contains("USD"));
        assert!(output.contains("87.8700"));
        assert!(output.contains("KGHS"));
        assert!(output.contains("Rate not found"));
        assert!(output.contains("KGS"));
    }
}
