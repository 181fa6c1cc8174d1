use ratesync::core::config::{AppConfig, FeedsConfig, StorageKind};
use ratesync::core::{FeedType, LookupError, RateStore};
use ratesync::store::disk::DiskRateStore;
use ratesync::{AppCommand, RateApp};
use std::fs;
use std::sync::Arc;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn feed(date: &str, entries: &[(&str, &str, &str)]) -> String {
        let currencies: String = entries
            .iter()
            .map(|(code, nominal, value)| {
                format!(
                    r#"
    <Currency ISOCode="{code}">
        <Nominal>{nominal}</Nominal>
        <Value>{value}</Value>
    </Currency>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CurrencyRates Name="Official exchange rates" Date="{date}">{currencies}
</CurrencyRates>"#
        )
    }

    pub async fn mount_feeds(mock_server: &MockServer, daily: &str, weekly: &str) {
        for (route, body) in [("/XML/daily.xml", daily), ("/XML/weekly.xml", weekly)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(mock_server)
                .await;
        }
    }

    pub async fn create_feed_server(daily: &str, weekly: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        mount_feeds(&mock_server, daily, weekly).await;
        mock_server
    }
}

fn config_for(server_uri: &str, data_path: Option<&std::path::Path>) -> AppConfig {
    AppConfig {
        feeds: FeedsConfig::new(
            &format!("{server_uri}/XML/daily.xml"),
            &format!("{server_uri}/XML/weekly.xml"),
        ),
        storage: if data_path.is_some() {
            StorageKind::Disk
        } else {
            StorageKind::Memory
        },
        data_path: data_path.map(|p| p.to_string_lossy().to_string()),
        ..Default::default()
    }
}

fn weekly_feed() -> String {
    test_utils::feed("07.08.2023", &[("AMD", "1", "0,2274"), ("GEL", "1", "33,6542")])
}

#[test_log::test(tokio::test)]
async fn test_sync_and_lookup_with_disk_store() {
    let daily = test_utils::feed("09.08.2023", &[("USD", "1", "87,8700"), ("KZT", "100", "19,58")]);
    let mock_server = test_utils::create_feed_server(&daily, &weekly_feed()).await;

    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = config_for(&mock_server.uri(), Some(data_dir.path()));
    let store = Arc::new(DiskRateStore::open(data_dir.path()).expect("Failed to open store"));
    let app = RateApp::new(config, store.clone()).expect("Failed to build app");

    app.synchronizer.sync_to_db().await;

    let usd = store
        .find_latest(&"USD".parse().unwrap())
        .await
        .unwrap()
        .expect("USD should be stored");
    info!(?usd, "Stored USD rate");
    assert_eq!(usd.record.exchange_date.to_string(), "2023-08-09");
    assert_eq!(usd.record.rate, 87.87);
    assert_eq!(usd.record.nominal, 1);
    assert_eq!(usd.record.feed_type, FeedType::Daily);

    assert_eq!(app.lookup.get_current_rate("USD").await.unwrap(), 87.87);
    assert!((app.lookup.get_current_rate("KZT").await.unwrap() - 0.1958).abs() < 1e-12);
    assert_eq!(app.lookup.get_current_rate("KGS").await.unwrap(), 1.0);
    assert!(app.lookup.get_current_rate("GEL").await.is_ok());
    assert_eq!(store.count().await.unwrap(), 4);

    let err = app.lookup.get_current_rate("KGHS").await.unwrap_err();
    assert!(matches!(err, LookupError::RateNotFound(_)));
    assert!(err.to_string().contains("KGHS"));
}

#[test_log::test(tokio::test)]
async fn test_repeated_sync_does_not_duplicate() {
    let daily = test_utils::feed("09.08.2023", &[("USD", "1", "87,8700")]);
    let mock_server = test_utils::create_feed_server(&daily, &weekly_feed()).await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = config_for(&mock_server.uri(), Some(data_dir.path()));
    let store = Arc::new(DiskRateStore::open(data_dir.path()).unwrap());
    let app = RateApp::new(config, store.clone()).unwrap();

    let first = app.synchronizer.try_sync().await.unwrap();
    let second = app.synchronizer.try_sync().await.unwrap();

    assert_eq!(first.summary.inserted, 3);
    assert_eq!(second.summary.inserted, 0);
    assert_eq!(second.summary.updated, 3);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[test_log::test(tokio::test)]
async fn test_latest_sync_wins_over_later_exchange_date() {
    let daily = test_utils::feed("10.08.2023", &[("USD", "1", "87,8700")]);
    let mock_server = test_utils::create_feed_server(&daily, &weekly_feed()).await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = config_for(&mock_server.uri(), Some(data_dir.path()));
    let store = Arc::new(DiskRateStore::open(data_dir.path()).unwrap());
    let app = RateApp::new(config, store).unwrap();
    app.synchronizer.sync_to_db().await;
    assert_eq!(app.lookup.get_current_rate("USD").await.unwrap(), 87.87);

    // The second publication carries an earlier date but is synced later.
    mock_server.reset().await;
    let daily = test_utils::feed("08.08.2023", &[("USD", "1", "90,00")]);
    test_utils::mount_feeds(&mock_server, &daily, &weekly_feed()).await;
    app.synchronizer.sync_to_db().await;

    assert_eq!(app.lookup.get_current_rate("USD").await.unwrap(), 90.0);
}

#[test_log::test(tokio::test)]
async fn test_failed_sync_keeps_previous_rates() {
    let daily = test_utils::feed("09.08.2023", &[("USD", "1", "87,8700")]);
    let mock_server = test_utils::create_feed_server(&daily, &weekly_feed()).await;

    let data_dir = tempfile::tempdir().unwrap();
    let config = config_for(&mock_server.uri(), Some(data_dir.path()));
    let store = Arc::new(DiskRateStore::open(data_dir.path()).unwrap());
    let app = RateApp::new(config, store.clone()).unwrap();
    app.synchronizer.sync_to_db().await;

    mock_server.reset().await;
    test_utils::mount_feeds(&mock_server, "<CurrencyRates Date=", &weekly_feed()).await;

    // Never propagates; the stored rates are unchanged.
    app.synchronizer.sync_to_db().await;
    assert!(app.synchronizer.try_sync().await.is_err());
    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(app.lookup.get_current_rate("USD").await.unwrap(), 87.87);
}

#[test_log::test(tokio::test)]
async fn test_run_command_sync_and_rates() {
    let daily = test_utils::feed("09.08.2023", &[("USD", "1", "87,8700")]);
    let mock_server = test_utils::create_feed_server(&daily, &weekly_feed()).await;

    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_path = config_file.path();
    let config_content = format!(
        r#"
        base_currency: KGS
        feeds:
          daily: {uri}/XML/daily.xml
          weekly: {uri}/XML/weekly.xml
        currencies: [KGS, USD, KGHS]
        storage: memory
    "#,
        uri = mock_server.uri()
    );
    fs::write(config_path, &config_content).expect("Failed to write config file");

    let result = ratesync::run_command(AppCommand::Sync, Some(config_path.to_str().unwrap())).await;
    assert!(result.is_ok(), "Sync failed with: {:?}", result.err());

    let result = ratesync::run_command(
        AppCommand::Rates {
            codes: vec![],
            sync_first: true,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_run_command_sync_reports_failure() {
    let mock_server = wiremock::MockServer::start().await;

    let config_file = tempfile::NamedTempFile::new().unwrap();
    let config_content = format!(
        "feeds:\n  daily: {uri}/XML/daily.xml\n  weekly: {uri}/XML/weekly.xml\nstorage: memory\n",
        uri = mock_server.uri()
    );
    fs::write(config_file.path(), config_content).unwrap();

    // No routes mounted: both feeds answer 404.
    let result =
        ratesync::run_command(AppCommand::Sync, Some(config_file.path().to_str().unwrap())).await;
    assert!(result.is_err());
}
