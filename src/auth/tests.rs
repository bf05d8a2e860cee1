//! Tests for the auth module

use super::*;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Provider that hands out numbered tokens and counts refreshes
struct CountingProvider {
    calls: Arc<AtomicUsize>,
    expires_in: i64,
}

#[async_trait]
impl TokenProvider for CountingProvider {
    async fn fetch_token(&self) -> Result<CachedToken> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CachedToken::expires_in(format!("token-{n}"), self.expires_in))
    }
}

#[tokio::test]
async fn test_static_bearer() {
    let auth = Authenticator::new(AuthConfig::Bearer {
        token: "abc".to_string(),
    });
    assert_eq!(auth.bearer_token().await.unwrap(), "abc");
    assert_eq!(auth.bearer_token().await.unwrap(), "abc");
}

#[tokio::test]
async fn test_token_cached_until_expiry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let auth = Authenticator::with_provider(CountingProvider {
        calls: Arc::clone(&calls),
        expires_in: 3600,
    });

    assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
    assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let calls = Arc::new(AtomicUsize::new(0));
    // expires_in = 0: now >= last_refreshed + 0 holds immediately
    let auth = Authenticator::with_provider(CountingProvider {
        calls: Arc::clone(&calls),
        expires_in: 0,
    });

    assert_eq!(auth.bearer_token().await.unwrap(), "token-1");
    assert_eq!(auth.bearer_token().await.unwrap(), "token-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_oauth2_refresh_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("client_id=my-client"))
        .and(body_string_contains("refresh_token=my-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::Oauth2Refresh {
        token_url: format!("{}/token", server.uri()),
        client_id: "my-client".to_string(),
        client_secret: "my-secret".to_string(),
        refresh_token: "my-refresh".to_string(),
    });

    assert_eq!(auth.bearer_token().await.unwrap(), "fresh-token");
    // Cached: no second request
    assert_eq!(auth.bearer_token().await.unwrap(), "fresh-token");
}

#[tokio::test]
async fn test_proxy_refresh_flow() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tokens/oauth2-google/token"))
        .and(header("Authorization", "Bearer proxy_url_token"))
        .and(body_json(json!({
            "refresh_token": "rt",
            "grant_type": "refresh_token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "refresh_token_updated",
            "expires_in": 3622
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::ProxyRefresh {
        proxy_url: format!("{}/api/tokens/oauth2-google/token", server.uri()),
        proxy_authorization: Some("Bearer proxy_url_token".to_string()),
        refresh_token: "rt".to_string(),
    });

    assert_eq!(auth.bearer_token().await.unwrap(), "refresh_token_updated");
}

#[tokio::test]
async fn test_refresh_failure_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let auth = Authenticator::new(AuthConfig::Oauth2Refresh {
        token_url: format!("{}/token", server.uri()),
        client_id: "c".to_string(),
        client_secret: "s".to_string(),
        refresh_token: "r".to_string(),
    });

    let err = auth.bearer_token().await.unwrap_err();
    assert!(matches!(err, Error::TokenRefresh { .. }));
    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_unusable_token_response_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    for endpoint in ["empty", "html"] {
        let auth = Authenticator::new(AuthConfig::ProxyRefresh {
            proxy_url: format!("{}/{endpoint}", server.uri()),
            proxy_authorization: None,
            refresh_token: "rt".to_string(),
        });
        let err = auth.bearer_token().await.unwrap_err();
        assert!(matches!(err, Error::Auth { .. }), "{endpoint}: {err}");
    }
}
