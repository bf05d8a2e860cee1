//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → token refresh → Google Ads
//! requests → Singer messages and persisted state

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tap_googleads::auth::Authenticator;
use tap_googleads::config::TapConfig;
use tap_googleads::engine::{SyncConfig, SyncEngine};
use tap_googleads::http::{HttpClient, HttpClientConfig, RequestExecutor};
use tap_googleads::output::{MemorySink, Message};
use tap_googleads::partition::AccountFilter;
use tap_googleads::state::StateManager;
use tap_googleads::streams::{
    RecordProcessor, StreamRegistry, CAMPAIGN, CLICK_VIEW_REPORT, CUSTOMER_HIERARCHY,
};
use tap_googleads::Error;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
}

fn proxy_config(server: &MockServer, extra: Value) -> TapConfig {
    let mut config = json!({
        "oauth_credentials": {
            "refresh_token": "refresh-me",
            "refresh_proxy_url": format!("{}/refresh", server.uri()),
            "refresh_proxy_url_auth": "Basic cHJveHk="
        },
        "developer_token": "dev-token",
        "customer_id": "111",
        "start_date": "2024-01-03",
        "api_url": format!("{}/v16", server.uri())
    });
    if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    let config = TapConfig::from_value(config).unwrap();
    config.validate().unwrap();
    config
}

fn build_engine(
    config: &TapConfig,
    state: StateManager,
    selected: &[&str],
) -> (SyncEngine, MemorySink) {
    let client =
        HttpClient::with_config(HttpClientConfig::builder().no_rate_limit().build()).unwrap();
    let authenticator =
        Authenticator::with_client(config.auth_config().unwrap(), client.inner().clone());
    let executor = RequestExecutor::new(
        Arc::new(client),
        Arc::new(authenticator),
        config.executor_config(today()).unwrap(),
    );

    let registry = Arc::new(StreamRegistry::default_streams(
        config.enable_click_view_report_stream,
    ));
    let sink = MemorySink::new();
    let engine = SyncEngine::new(registry, executor, state, Box::new(sink.clone()))
        .with_config(
            SyncConfig::new()
                .with_today(today())
                .with_start_date(config.start_date().unwrap())
                .with_end_date(config.end_date().unwrap())
                .with_selected_streams(selected.iter().copied()),
        )
        .with_processor(RecordProcessor::new(AccountFilter::new(config.customer_ids())));

    (engine, sink)
}

async fn mount_token_proxy(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .and(header("Authorization", "Basic cHJveHk="))
        .and(body_json(json!({
            "refresh_token": "refresh-me",
            "grant_type": "refresh_token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_accounts(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v16/customers:listAccessibleCustomers"))
        .and(header("Authorization", "Bearer access-1"))
        .and(header("developer-token", "dev-token"))
        .and(header("login-customer-id", "111"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"resourceNames": ["customers/111"]})),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v16/customers/111/googleAds:search"))
        .and(body_string_contains("FROM customer_client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"customerClient": {
                "id": "111",
                "clientCustomer": "customers/111",
                "manager": false,
                "status": "ENABLED"
            }}]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// End-to-end read
// ============================================================================

#[tokio::test]
async fn test_read_campaigns_through_proxy_refresh() {
    let server = MockServer::start().await;
    mount_token_proxy(&server).await;
    mount_accounts(&server).await;

    Mock::given(method("POST"))
        .and(path("/v16/customers/111/googleAds:search"))
        .and(body_string_contains("FROM campaign"))
        .and(body_string_contains("\"pageToken\":\"next\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"campaign": {"id": "2", "name": "Generic"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v16/customers/111/googleAds:search"))
        .and(body_json(json!({
            "query": "SELECT campaign.id, campaign.name FROM campaign ORDER BY campaign.id"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"campaign": {"id": "1", "name": "Brand"}}],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = proxy_config(&server, json!({}));
    let (mut engine, sink) = build_engine(&config, StateManager::in_memory(), &[CAMPAIGN]);

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.records_synced, 2);

    let kinds: Vec<&str> = sink
        .messages()
        .iter()
        .map(|m| match m {
            Message::Schema { .. } => "SCHEMA",
            Message::Record { .. } => "RECORD",
            Message::State { .. } => "STATE",
        })
        .collect();
    assert_eq!(kinds.first(), Some(&"STATE"));
    assert_eq!(kinds.last(), Some(&"STATE"));
    assert_eq!(
        kinds.iter().filter(|k| **k != "STATE").copied().collect::<Vec<_>>(),
        vec!["SCHEMA", "RECORD", "RECORD"]
    );

    assert_eq!(
        sink.records(CAMPAIGN),
        vec![
            json!({"campaign": {"id": "1", "name": "Brand"}, "customer_id": "111"}),
            json!({"campaign": {"id": "2", "name": "Generic"}, "customer_id": "111"}),
        ]
    );
    assert!(sink.records(CUSTOMER_HIERARCHY).is_empty());
}

#[tokio::test]
async fn test_report_permission_error_is_skipped() {
    let server = MockServer::start().await;
    mount_token_proxy(&server).await;
    mount_accounts(&server).await;

    Mock::given(method("POST"))
        .and(path("/v16/customers/111/googleAds:search"))
        .and(body_string_contains("FROM campaign"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let config = proxy_config(&server, json!({}));
    let (mut engine, sink) = build_engine(&config, StateManager::in_memory(), &[CAMPAIGN]);

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.contexts_skipped, 1);
    assert!(sink.records(CAMPAIGN).is_empty());
}

#[tokio::test]
async fn test_token_refresh_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad refresh token"))
        .mount(&server)
        .await;

    let config = proxy_config(&server, json!({}));
    let (mut engine, sink) = build_engine(&config, StateManager::in_memory(), &[CAMPAIGN]);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert!(sink.records(CAMPAIGN).is_empty());
}

#[tokio::test]
async fn test_direct_oauth_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("client_id=cid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_accounts(&server).await;
    Mock::given(method("POST"))
        .and(body_string_contains("FROM campaign"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let config = proxy_config(
        &server,
        json!({
            "oauth_credentials": {
                "client_id": "cid",
                "client_secret": "secret",
                "refresh_token": "refresh-me"
            },
            "token_url": format!("{}/token", server.uri())
        }),
    );
    let (mut engine, _sink) = build_engine(&config, StateManager::in_memory(), &[CAMPAIGN]);

    let stats = engine.run().await.unwrap();
    assert_eq!(stats.contexts_completed, 3);
}

// ============================================================================
// State persistence
// ============================================================================

async fn mount_click_view(server: &MockServer, date: &str) {
    Mock::given(method("POST"))
        .and(path("/v16/customers/111/googleAds:search"))
        .and(body_string_contains("FROM click_view"))
        .and(body_string_contains(format!("segments.date = '{date}'")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "clickView": {"gclid": format!("g-{date}")},
                "customer": {"id": "111"},
                "adGroup": {"id": "1"},
                "campaign": {"id": "2"},
                "segments": {
                    "date": date,
                    "device": "DESKTOP",
                    "adNetworkType": "SEARCH",
                    "slot": "SEARCH_TOP"
                }
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_click_view_checkpoint_persisted_and_resumed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    mount_accounts(&server).await;
    mount_click_view(&server, "2024-01-03").await;
    mount_click_view(&server, "2024-01-04").await;

    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let config = proxy_config(&server, json!({"enable_click_view_report_stream": true}));

    // First run: both days, checkpoint written to disk
    let (mut engine, sink) = build_engine(
        &config,
        StateManager::from_file(&state_path).unwrap(),
        &[CLICK_VIEW_REPORT],
    );
    engine.run().await.unwrap();
    engine.state().save().await.unwrap();

    let dates: Vec<Value> = sink
        .records(CLICK_VIEW_REPORT)
        .into_iter()
        .map(|r| r["date"].clone())
        .collect();
    assert_eq!(dates, vec![json!("2024-01-03"), json!("2024-01-04")]);

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(&state_path).unwrap()).unwrap();
    assert_eq!(
        saved["bookmarks"][CLICK_VIEW_REPORT]["partitions"][0],
        json!({
            "context": {"customer_id": "111"},
            "replication_key": "date",
            "replication_key_value": "2024-01-04"
        })
    );

    // Second run: resumes at the checkpoint day only
    let (mut engine, sink) = build_engine(
        &config,
        StateManager::from_file(&state_path).unwrap(),
        &[CLICK_VIEW_REPORT],
    );
    engine.run().await.unwrap();

    let dates: Vec<Value> = sink
        .records(CLICK_VIEW_REPORT)
        .into_iter()
        .map(|r| r["date"].clone())
        .collect();
    assert_eq!(dates, vec![json!("2024-01-04")]);
}
