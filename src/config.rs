//! Tap configuration
//!
//! This module contains the configuration accepted by the tap (JSON file or
//! inline JSON), the description printed by the `spec` command and the
//! catalog printed by `discover`.

use crate::auth::{AuthConfig, DEFAULT_TOKEN_URL};
use crate::error::{Error, Result};
use crate::http::{ExecutorConfig, DEFAULT_API_URL};
use crate::partition::{parse_date, DEFAULT_LOOKBACK_DAYS};
use crate::streams::{StreamDefinition, StreamRegistry};
use crate::types::{OptionStringExt, ReplicationMethod};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

// ============================================================================
// Tap Config
// ============================================================================

/// Complete tap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TapConfig {
    /// Refresh-token credentials
    #[serde(default)]
    pub oauth_credentials: Option<OAuthCredentials>,

    /// Google Ads developer token
    #[serde(default)]
    pub developer_token: Option<String>,

    /// `login-customer-id` header when going through a manager account
    #[serde(default)]
    pub login_customer_id: Option<String>,

    /// `login-customer-id` header when not using a manager account
    #[serde(default)]
    pub customer_id: Option<String>,

    /// Only sync these client accounts
    #[serde(default)]
    pub customer_ids: Option<Vec<String>>,

    /// First day of date-filtered queries (RFC 3339 or `YYYY-MM-DD`)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Last day of date-filtered queries (RFC 3339 or `YYYY-MM-DD`)
    #[serde(default)]
    pub end_date: Option<String>,

    /// Register the click view report stream
    #[serde(default)]
    pub enable_click_view_report_stream: bool,

    /// `User-Agent` header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// API base URL override
    #[serde(default)]
    pub api_url: Option<String>,

    /// OAuth token endpoint override
    #[serde(default)]
    pub token_url: Option<String>,
}

/// Credentials used to mint bearer tokens
///
/// Either `client_id` + `client_secret` (direct refresh) or
/// `refresh_proxy_url` (refresh through a proxy) must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OAuthCredentials {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_proxy_url: Option<String>,
    #[serde(default)]
    pub refresh_proxy_url_auth: Option<String>,
}

impl TapConfig {
    /// Parse config from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::config(format!("invalid configuration: {e}")))
    }

    /// Parse config from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("invalid configuration: {e}")))
    }

    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Check required fields and date formats
    pub fn validate(&self) -> Result<()> {
        if self.developer_token.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("developer_token"));
        }
        self.auth_config()?;
        self.start_date()?;
        self.end_date()?;

        let proxy_url = self
            .oauth_credentials
            .as_ref()
            .and_then(|c| c.refresh_proxy_url.as_deref());
        for url in [self.api_url.as_deref(), self.token_url.as_deref(), proxy_url]
            .into_iter()
            .flatten()
            .filter(|u| !u.trim().is_empty())
        {
            url::Url::parse(url)?;
        }
        Ok(())
    }

    /// Token exchange flavor implied by the credentials
    ///
    /// Direct refresh when client id and secret are both set, otherwise the
    /// refresh proxy.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let creds = self
            .oauth_credentials
            .as_ref()
            .ok_or_else(|| Error::missing_field("oauth_credentials"))?;
        let refresh_token = creds
            .refresh_token
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("oauth_credentials.refresh_token"))?;

        let client_id = creds.client_id.clone().none_if_empty();
        let client_secret = creds.client_secret.clone().none_if_empty();
        if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
            return Ok(AuthConfig::Oauth2Refresh {
                token_url: self
                    .token_url
                    .clone()
                    .none_if_empty()
                    .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                client_id,
                client_secret,
                refresh_token,
            });
        }

        match creds.refresh_proxy_url.clone().none_if_empty() {
            Some(proxy_url) => Ok(AuthConfig::ProxyRefresh {
                proxy_url,
                proxy_authorization: creds.refresh_proxy_url_auth.clone().none_if_empty(),
                refresh_token,
            }),
            None => Err(Error::invalid_value(
                "oauth_credentials",
                "needs client_id and client_secret, or refresh_proxy_url",
            )),
        }
    }

    /// Configured start date
    pub fn start_date(&self) -> Result<Option<NaiveDate>> {
        parse_config_date("start_date", self.start_date.as_deref())
    }

    /// Configured end date
    pub fn end_date(&self) -> Result<Option<NaiveDate>> {
        parse_config_date("end_date", self.end_date.as_deref())
    }

    /// Value of the `login-customer-id` header
    pub fn login_customer_id(&self) -> Option<String> {
        self.login_customer_id
            .clone()
            .none_if_empty()
            .or_else(|| self.customer_id.clone().none_if_empty())
    }

    /// Allow-list of client accounts, if any
    pub fn customer_ids(&self) -> Option<Vec<String>> {
        self.customer_ids.clone().filter(|ids| !ids.is_empty())
    }

    /// Request settings for a run on `today`
    ///
    /// The report range defaults to the last `DEFAULT_LOOKBACK_DAYS` days
    /// through today.
    pub fn executor_config(&self, today: NaiveDate) -> Result<ExecutorConfig> {
        let developer_token = self
            .developer_token
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("developer_token"))?;
        let start = self
            .start_date()?
            .unwrap_or_else(|| today - Duration::days(DEFAULT_LOOKBACK_DAYS));
        let end = self.end_date()?.unwrap_or(today);

        Ok(ExecutorConfig::new(developer_token)
            .with_base_url(
                self.api_url
                    .clone()
                    .none_if_empty()
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            )
            .with_login_customer_id(self.login_customer_id())
            .with_user_agent(self.user_agent.clone().none_if_empty())
            .with_date_range(start, end))
    }
}

fn parse_config_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => parse_date(text)
            .map(Some)
            .map_err(|e| Error::invalid_value(field, e.to_string())),
    }
}

/// Description of the accepted configuration, printed by `spec`
pub fn config_spec() -> Value {
    json!({
        "type": "object",
        "required": ["oauth_credentials", "developer_token"],
        "properties": {
            "oauth_credentials": {
                "type": "object",
                "required": ["refresh_token"],
                "properties": {
                    "client_id": {"type": "string"},
                    "client_secret": {"type": "string", "secret": true},
                    "refresh_token": {"type": "string", "secret": true},
                    "refresh_proxy_url": {"type": "string"},
                    "refresh_proxy_url_auth": {"type": "string", "secret": true}
                },
                "additionalProperties": false
            },
            "developer_token": {"type": "string", "secret": true},
            "login_customer_id": {
                "type": "string",
                "description": "Value to use in the login-customer-id header if using a manager customer account."
            },
            "customer_id": {
                "type": "string",
                "description": "Value to use in the login-customer-id header when not using a manager customer account."
            },
            "customer_ids": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Only sync these client accounts instead of every accessible one."
            },
            "start_date": {
                "type": "string",
                "format": "date-time",
                "description": "Start date for all of the streams that use date based filtering."
            },
            "end_date": {
                "type": "string",
                "format": "date-time",
                "description": "End date for all of the streams that use date based filtering."
            },
            "enable_click_view_report_stream": {
                "type": "boolean",
                "default": false,
                "description": "Enables the click view report stream. Requires extra permission on the Google Ads account(s)."
            },
            "user_agent": {"type": "string"},
            "api_url": {"type": "string", "default": DEFAULT_API_URL},
            "token_url": {"type": "string", "default": DEFAULT_TOKEN_URL}
        }
    })
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Catalog of every registered stream, in sync order
    pub fn from_registry(registry: &StreamRegistry) -> Self {
        Self {
            streams: registry.iter().map(CatalogStream::from_definition).collect(),
        }
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub stream: String,

    /// Stream id (same as the name)
    pub tap_stream_id: String,

    /// JSON schema for the stream
    pub schema: Value,

    /// Primary-key field paths
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Replication-key field path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Replication method
    pub replication_method: ReplicationMethod,

    /// Parent stream providing the contexts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_stream: Option<String>,
}

impl CatalogStream {
    /// Catalog entry for a stream definition
    pub fn from_definition(definition: &StreamDefinition) -> Self {
        Self {
            stream: definition.name.clone(),
            tap_stream_id: definition.name.clone(),
            schema: definition.schema.to_json(),
            key_properties: definition.primary_keys.clone(),
            replication_key: definition.replication_key.clone(),
            replication_method: definition.replication_method(),
            parent_stream: definition.parent.clone(),
        }
    }
}
