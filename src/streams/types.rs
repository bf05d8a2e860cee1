//! Stream definition types
//!
//! A stream is a static shape: request, record selector, keys, schema and
//! a set of capability tags. Behaviour differences between streams are
//! expressed through tags and transforms, never through separate types.

use crate::decode::RecordSelector;
use crate::error::{Error, Result};
use crate::pagination::{PaginationConfig, TokenPlacement, NEXT_PAGE_TOKEN_PATH};
use crate::partition::{ChildContextRule, StreamContext};
use crate::schema::JsonSchema;
use crate::types::{lookup_path, Method, ReplicationMethod};
use serde_json::Value;

/// Path of the account listing endpoint
pub const LIST_ACCESSIBLE_CUSTOMERS_PATH: &str = "/customers:listAccessibleCustomers";

/// Path template of the search endpoint
pub const SEARCH_PATH: &str = "/customers/{{ customer_id }}/googleAds:search";

/// Capability tags that switch orchestration behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamTag {
    /// Each context is queried one day at a time
    DateWindowed,
    /// Only the first completed context is synced
    SyncOnce,
    /// HTTP 400/403 abandons the context instead of failing the run
    ToleratesPermissionErrors,
}

/// Record post-processing steps, applied in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTransform {
    /// Default an absent `resourceNames` to an empty list
    ResourceNames,
    /// Drop manager, disabled and not-allow-listed accounts
    AccountFilter,
    /// Copy the context's `customer_id` onto the record when absent
    AttachCustomerId,
    /// Hoist `segments.date` to `date` and default a missing keyword
    ClickView,
}

/// Request issued for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestShape {
    /// HTTP method
    pub method: Method,
    /// Path template relative to the API base
    pub path: String,
    /// GAQL query template sent as the `query` body field
    pub query: Option<String>,
}

impl RequestShape {
    /// `GET /customers:listAccessibleCustomers`
    pub fn list_accessible_customers() -> Self {
        Self {
            method: Method::GET,
            path: LIST_ACCESSIBLE_CUSTOMERS_PATH.to_string(),
            query: None,
        }
    }

    /// `POST /customers/{customer_id}/googleAds:search` with a GAQL query
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: SEARCH_PATH.to_string(),
            query: Some(query.into()),
        }
    }
}

/// Static description of one logical stream
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name
    pub name: String,
    /// Ordered primary-key field paths (`__`-separated)
    pub primary_keys: Vec<String>,
    /// Replication-key field path for incremental streams
    pub replication_key: Option<String>,
    /// Parent stream providing this stream's contexts
    pub parent: Option<String>,
    /// Request shape
    pub request: RequestShape,
    /// Where records live in the response envelope
    pub selector: RecordSelector,
    /// How pages continue
    pub pagination: PaginationConfig,
    /// How this stream's records become child contexts
    pub child_rule: ChildContextRule,
    /// Post-processing steps
    pub transforms: Vec<RecordTransform>,
    /// Record schema
    pub schema: JsonSchema,
    /// Capability tags
    pub tags: Vec<StreamTag>,
}

impl StreamDefinition {
    /// Create a definition with defaults: `results` selector, no
    /// pagination, no keys
    pub fn new(name: impl Into<String>, request: RequestShape) -> Self {
        Self {
            name: name.into(),
            primary_keys: Vec::new(),
            replication_key: None,
            parent: None,
            request,
            selector: RecordSelector::results(),
            pagination: PaginationConfig::None,
            child_rule: ChildContextRule::None,
            transforms: Vec::new(),
            schema: JsonSchema::new(),
            tags: Vec::new(),
        }
    }

    /// Search stream paginated by `nextPageToken` in the request body
    pub fn search(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(name, RequestShape::search(query)).with_pagination(
            PaginationConfig::page_token(
                NEXT_PAGE_TOKEN_PATH,
                TokenPlacement::Body("pageToken".to_string()),
            ),
        )
    }

    #[must_use]
    pub fn with_primary_keys(mut self, keys: &[&str]) -> Self {
        self.primary_keys = keys.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_replication_key(mut self, key: impl Into<String>) -> Self {
        self.replication_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_selector(mut self, selector: RecordSelector) -> Self {
        self.selector = selector;
        self
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_child_rule(mut self, rule: ChildContextRule) -> Self {
        self.child_rule = rule;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: RecordTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: JsonSchema) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: StreamTag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    /// Whether a capability tag is set
    pub fn has_tag(&self, tag: StreamTag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn is_date_windowed(&self) -> bool {
        self.has_tag(StreamTag::DateWindowed)
    }

    pub fn is_sync_once(&self) -> bool {
        self.has_tag(StreamTag::SyncOnce)
    }

    pub fn tolerates_permission_errors(&self) -> bool {
        self.has_tag(StreamTag::ToleratesPermissionErrors)
    }

    /// Streams without a parent run once with the root context
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Incremental when a replication key is declared
    pub fn replication_method(&self) -> ReplicationMethod {
        if self.replication_key.is_some() {
            ReplicationMethod::Incremental
        } else {
            ReplicationMethod::FullTable
        }
    }

    /// Resolve the primary-key tuple of a record
    ///
    /// Each path is looked up in the record first, then in the context.
    pub fn primary_key_values(&self, record: &Value, context: &StreamContext) -> Result<Vec<Value>> {
        self.primary_keys
            .iter()
            .map(|key| {
                if let Some(value) = lookup_path(record, key).filter(|v| !v.is_null()) {
                    return Ok(value.clone());
                }
                context
                    .get(key)
                    .map(Value::String)
                    .ok_or_else(|| Error::MissingPrimaryKey {
                        stream: self.name.clone(),
                        key: key.clone(),
                    })
            })
            .collect()
    }

    /// Replication-key value of a record, as text
    pub fn replication_value(&self, record: &Value) -> Option<String> {
        let key = self.replication_key.as_deref()?;
        lookup_path(record, key).and_then(crate::types::scalar_to_string)
    }
}
