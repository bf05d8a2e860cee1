//! Transport seam
//!
//! The executor never talks to reqwest directly: it hands a fully built
//! `ApiRequest` to a `Transport` and classifies the returned status.

use crate::error::Result;
use crate::types::Method;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// One fully resolved outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Query parameters
    pub query: BTreeMap<String, String>,
    /// JSON body
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request without headers, query or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
        }
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Raw response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
}

impl ApiResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a request and returns status and body
///
/// Only failures to obtain any response (DNS, connect, TLS) are errors;
/// every HTTP status is returned as an `ApiResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}
