//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available; send this token with the next request
    Continue {
        /// Continuation token
        token: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::Continue {
            token: token.into(),
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }

    /// The continuation token, if any
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Continue { token } => Some(token),
            Self::Done => None,
        }
    }
}

/// Where the continuation token goes in the next request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPlacement {
    /// Field of the JSON request body
    Body(String),
    /// URL query parameter
    Query(String),
}

impl TokenPlacement {
    /// Parameter or field name
    pub fn name(&self) -> &str {
        match self {
            Self::Body(name) | Self::Query(name) => name,
        }
    }
}

/// Configuration for pagination behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PaginationConfig {
    /// Single-page endpoint
    #[default]
    None,

    /// Page token read from the response envelope
    PageToken {
        /// JSONPath to the token in the response
        token_path: String,
        /// Where to send the token
        placement: TokenPlacement,
    },
}

impl PaginationConfig {
    /// Create page token pagination config
    pub fn page_token(token_path: impl Into<String>, placement: TokenPlacement) -> Self {
        Self::PageToken {
            token_path: token_path.into(),
            placement,
        }
    }
}

/// Core trait for pagination strategies
///
/// Implementations look only at the immediately preceding page. The API is
/// trusted never to repeat a token; there is no loop detection.
pub trait Paginator: Send + Sync {
    /// Where the token belongs in the next request (`None` for single-page streams)
    fn placement(&self) -> Option<&TokenPlacement>;

    /// Decide the next token from the previous token and the page body
    fn next_page(&self, previous_token: Option<&str>, body: &Value) -> NextPage;
}

/// Extract a string value from JSON using a simple JSONPath expression
///
/// Supports basic paths like "$.nextPageToken" or "data.token".
pub fn extract_jsonpath(value: &Value, path: &str) -> Option<String> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
