//! Authenticator implementation
//!
//! Obtains bearer tokens through a [`TokenProvider`] and caches them until
//! they expire. One `Authenticator` is shared (behind an `Arc`) by every
//! request executor using the same credential.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Source of fresh bearer tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange the stored credential for a new token
    async fn fetch_token(&self) -> Result<CachedToken>;
}

/// Token provider that talks to an OAuth token endpoint (or proxy)
pub struct OAuthTokenProvider {
    /// Auth configuration
    config: AuthConfig,
    /// HTTP client for token requests
    http_client: Client,
}

impl OAuthTokenProvider {
    /// Create a provider for the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a provider with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Fetch OAuth2 token using refresh token flow
    async fn fetch_oauth2_refresh(
        &self,
        token_url: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<CachedToken> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Refresh token request failed with status {status}: {body}"),
            });
        }

        read_token_response(response).await
    }

    /// Fetch a token from a refresh proxy
    async fn fetch_proxy_refresh(
        &self,
        proxy_url: &str,
        proxy_authorization: Option<&str>,
        refresh_token: &str,
    ) -> Result<CachedToken> {
        let mut req = self
            .http_client
            .post(proxy_url)
            .header("Accept", "application/json")
            .json(&json!({
                "refresh_token": refresh_token,
                "grant_type": "refresh_token",
            }));

        if let Some(authorization) = proxy_authorization {
            req = req.header("Authorization", authorization);
        }

        let response = req.send().await.map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Proxy token request failed with status {status}: {body}"),
            });
        }

        read_token_response(response).await
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn fetch_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Bearer { token } => Ok(CachedToken::new(token.clone())),

            AuthConfig::Oauth2Refresh {
                token_url,
                client_id,
                client_secret,
                refresh_token,
            } => {
                self.fetch_oauth2_refresh(token_url, client_id, client_secret, refresh_token)
                    .await
            }

            AuthConfig::ProxyRefresh {
                proxy_url,
                proxy_authorization,
                refresh_token,
            } => {
                self.fetch_proxy_refresh(proxy_url, proxy_authorization.as_deref(), refresh_token)
                    .await
            }
        }
    }
}

/// Credential cache shared by all executors of one credential
pub struct Authenticator {
    /// Where fresh tokens come from
    provider: Box<dyn TokenProvider>,
    /// Cached token
    cached_token: RwLock<Option<CachedToken>>,
}

impl Authenticator {
    /// Create an authenticator backed by the OAuth endpoint described by `config`
    pub fn new(config: AuthConfig) -> Self {
        Self::with_provider(OAuthTokenProvider::new(config))
    }

    /// Create an authenticator sharing an HTTP client with the caller
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self::with_provider(OAuthTokenProvider::with_client(config, http_client))
    }

    /// Create an authenticator with a custom token provider
    pub fn with_provider(provider: impl TokenProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cached_token: RwLock::new(None),
        }
    }

    /// Get a valid bearer token, refreshing if necessary
    pub async fn bearer_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        debug!("Refreshing bearer token");
        let new_token = self.provider.fetch_token().await?;
        info!("OAuth authorization attempt was successful");
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_cached_token(self) -> Result<CachedToken> {
        if self.access_token.trim().is_empty() {
            return Err(Error::auth("token endpoint returned an empty access_token"));
        }
        Ok(match self.expires_in {
            Some(secs) => CachedToken::expires_in(self.access_token, secs),
            None => CachedToken::new(self.access_token),
        })
    }
}

/// Decode a successful token endpoint response
async fn read_token_response(response: reqwest::Response) -> Result<CachedToken> {
    let body = response.text().await.map_err(Error::Http)?;
    let token_response: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| Error::auth(format!("unreadable token response: {e}")))?;
    token_response.into_cached_token()
}
