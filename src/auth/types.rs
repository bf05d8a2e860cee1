//! Auth configuration types
//!
//! These types describe how a bearer token is obtained and how long a cached
//! token stays valid.

use chrono::{DateTime, Duration, Utc};

/// Default Google OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";

/// Authentication configuration
#[derive(Debug, Clone)]
pub enum AuthConfig {
    /// Static bearer token (never refreshed)
    Bearer {
        /// The bearer token
        token: String,
    },

    /// OAuth2 Refresh Token flow against the token endpoint
    Oauth2Refresh {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Refresh token
        refresh_token: String,
    },

    /// Refresh through a proxy that holds the client secret
    ProxyRefresh {
        /// Proxy endpoint URL
        proxy_url: String,
        /// Value for the `Authorization` header sent to the proxy
        proxy_authorization: Option<String>,
        /// Refresh token
        refresh_token: String,
    },
}

impl AuthConfig {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Oauth2Refresh { .. } => "oauth2_refresh",
            AuthConfig::ProxyRefresh { .. } => "proxy_refresh",
        }
    }
}

/// Cached token with its refresh bookkeeping
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token was obtained
    pub last_refreshed: DateTime<Utc>,
    /// Lifetime in seconds; `None` never expires
    pub expires_in: Option<i64>,
}

impl CachedToken {
    /// Create a token that never expires
    pub fn new(token: String) -> Self {
        Self {
            token,
            last_refreshed: Utc::now(),
            expires_in: None,
        }
    }

    /// Create a token obtained now that lives for `seconds`
    pub fn expires_in(token: String, seconds: i64) -> Self {
        Self::refreshed_at(token, Utc::now(), seconds)
    }

    /// Create a token obtained at `last_refreshed`
    pub fn refreshed_at(token: String, last_refreshed: DateTime<Utc>, seconds: i64) -> Self {
        Self {
            token,
            last_refreshed,
            expires_in: Some(seconds),
        }
    }

    /// Check expiry against an explicit instant: `now >= last_refreshed + expires_in`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_in {
            Some(seconds) => now >= self.last_refreshed + Duration::seconds(seconds),
            None => false,
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_expired() {
        let token = CachedToken::expires_in("test".to_string(), -100);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_expiry_boundary() {
        let refreshed = Utc::now();
        let token = CachedToken::refreshed_at("t".to_string(), refreshed, 60);
        assert!(!token.is_expired_at(refreshed + Duration::seconds(59)));
        assert!(token.is_expired_at(refreshed + Duration::seconds(60)));
        assert!(token.is_expired_at(refreshed + Duration::seconds(61)));
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test".to_string());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_auth_config_kind() {
        let config = AuthConfig::Bearer {
            token: "t".to_string(),
        };
        assert_eq!(config.kind(), "bearer");
    }
}
