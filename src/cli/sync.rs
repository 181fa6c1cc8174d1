use super::ui;
use crate::RateApp;
use crate::core::SyncReport;
use anyhow::{Context, Result};
use std::io;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

pub fn display_report(report: &SyncReport) -> String {
    let mut output = format!(
        "Fetched {} daily and {} weekly rates\n",
        report.daily, report.weekly
    );
    output.push_str(&format!(
        "Stored: {} new, {} updated",
        ui::style_text(&report.summary.inserted.to_string(), ui::StyleType::Value),
        ui::style_text(&report.summary.updated.to_string(), ui::StyleType::Value),
    ));
    if report.skipped > 0 {
        output.push_str(&ui::style_text(
            &format!(" ({} base currency entries skipped)", report.skipped),
            ui::StyleType::Subtle,
        ));
    }
    output
}

/// Runs a single sync and reports the outcome. Unlike the scheduled path,
/// a failure here is returned so the process exits non-zero.
pub async fn run_once(app: &RateApp) -> Result<()> {
    let spinner = ui::new_spinner("Synchronizing currency rates...");
    let result = app.synchronizer.try_sync().await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            println!("{}", display_report(&report));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error));
            Err(e).context("Currency rate sync failed")
        }
    }
}

/// Triggers a sync every configured interval until Ctrl-C. Failed runs are
/// logged by the synchronizer and retried on the next tick.
pub async fn watch(app: &RateApp) -> Result<()> {
    watch_until(app, tokio::signal::ctrl_c()).await
}

/// Runs the sync schedule until `shutdown` resolves. Shutdown is observed
/// while waiting for a tick and while a sync is in flight.
pub async fn watch_until<F>(app: &RateApp, shutdown: F) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    let period = app.config.sync.interval();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(?period, "Watching currency rate feeds");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            signal = &mut shutdown => return stop(signal),
        }
        tokio::select! {
            _ = app.synchronizer.sync_to_db() => {}
            signal = &mut shutdown => return stop(signal),
        }
    }
}

fn stop(signal: io::Result<()>) -> Result<()> {
    signal.context("Failed to listen for shutdown signal")?;
    info!("Shutting down rate watcher");
    Ok(())
}
