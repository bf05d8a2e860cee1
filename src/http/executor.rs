//! Request executor
//!
//! Turns (stream, context, page token) into one API call and the call's
//! response into a `Page`.

use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::auth::Authenticator;
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::pagination::{create_paginator, TokenPlacement};
use crate::partition::{quote_date, StreamContext};
use crate::streams::StreamDefinition;
use crate::template::{render, TemplateContext};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Google Ads REST base URL
pub const DEFAULT_API_URL: &str = "https://googleads.googleapis.com/v16";

/// One page of a stream
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records in response order
    pub records: Vec<Value>,
    /// Token for the next request, `None` at end of stream
    pub next_page_token: Option<String>,
}

/// Settings shared by every request of a run
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// API base URL
    pub base_url: String,
    /// `developer-token` header
    pub developer_token: String,
    /// `login-customer-id` header
    pub login_customer_id: Option<String>,
    /// `User-Agent` header
    pub user_agent: Option<String>,
    /// Run-wide template values (`start_date`, `end_date`)
    pub template_values: Value,
}

impl ExecutorConfig {
    /// Create a config against the default API URL
    pub fn new(developer_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            developer_token: developer_token.into(),
            login_customer_id: None,
            user_agent: None,
            template_values: json!({}),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_login_customer_id(mut self, id: Option<String>) -> Self {
        self.login_customer_id = id;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, agent: Option<String>) -> Self {
        self.user_agent = agent;
        self
    }

    /// Expose the report date range to query templates as GAQL literals
    #[must_use]
    pub fn with_date_range(mut self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        self.template_values = json!({
            "start_date": quote_date(start_date),
            "end_date": quote_date(end_date),
        });
        self
    }
}

/// Issues the requests of every stream
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    authenticator: Arc<Authenticator>,
    config: ExecutorConfig,
}

impl RequestExecutor {
    /// Create an executor
    pub fn new(
        transport: Arc<dyn Transport>,
        authenticator: Arc<Authenticator>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            transport,
            authenticator,
            config,
        }
    }

    /// Run-wide settings
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Fetch one page
    ///
    /// Non-2xx responses become `Error::HttpStatus` carrying status and body.
    pub async fn execute(
        &self,
        definition: &StreamDefinition,
        context: &StreamContext,
        page_token: Option<&str>,
    ) -> Result<Page> {
        let bearer = self.authenticator.bearer_token().await?;
        let request = self.build_request(definition, context, page_token, &bearer)?;

        debug!(stream = %definition.name, %context, "{} {}", request.method, request.url);
        let response = self.transport.send(request).await?;
        self.decode(definition, page_token, response)
    }

    /// Build the request for one page
    pub fn build_request(
        &self,
        definition: &StreamDefinition,
        context: &StreamContext,
        page_token: Option<&str>,
        bearer: &str,
    ) -> Result<ApiRequest> {
        let mut templates = TemplateContext::with_config(self.config.template_values.clone());
        templates.set_partition(context.template_values());

        let shape = &definition.request;
        let path = render(&shape.path, &templates)?;
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let mut request = ApiRequest::new(shape.method, url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("developer-token", self.config.developer_token.as_str());
        if let Some(id) = &self.config.login_customer_id {
            request = request.header("login-customer-id", id.as_str());
        }
        if let Some(agent) = &self.config.user_agent {
            request = request.header("User-Agent", agent.as_str());
        }

        let mut body = Map::new();
        if let Some(query) = &shape.query {
            body.insert("query".to_string(), Value::String(render(query, &templates)?));
        }

        if let Some(token) = page_token {
            match create_paginator(&definition.pagination).placement() {
                Some(TokenPlacement::Body(field)) => {
                    body.insert(field.clone(), Value::String(token.to_string()));
                }
                Some(TokenPlacement::Query(param)) => {
                    request = request.query(param.as_str(), token);
                }
                None => {
                    return Err(Error::config(format!(
                        "stream '{}' is not paginated but got a page token",
                        definition.name
                    )))
                }
            }
        }

        if !body.is_empty() {
            request = request.json(Value::Object(body));
        }
        Ok(request)
    }

    fn decode(
        &self,
        definition: &StreamDefinition,
        page_token: Option<&str>,
        response: ApiResponse,
    ) -> Result<Page> {
        if !response.is_success() {
            return Err(Error::http_status(response.status, response.body));
        }

        let decoder = JsonDecoder::with_selector(definition.selector.clone());
        let envelope = decoder.decode_raw(&response.body)?;
        let records = decoder.extract(&envelope)?;
        let next = create_paginator(&definition.pagination).next_page(page_token, &envelope);

        Ok(Page {
            records,
            next_page_token: next.token().map(ToString::to_string),
        })
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
