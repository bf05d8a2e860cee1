//! Pagination strategy implementations

use super::types::{extract_jsonpath, NextPage, PaginationConfig, Paginator, TokenPlacement};
use serde_json::Value;

/// Default location of the continuation token in a search response
pub const NEXT_PAGE_TOKEN_PATH: &str = "$.nextPageToken";

// ============================================================================
// Page Token Pagination
// ============================================================================

/// Page-token pagination (Google Ads search)
///
/// Reads the token from a fixed path in the envelope. A missing, `null` or
/// empty token ends the stream.
#[derive(Debug, Clone)]
pub struct PageTokenPaginator {
    /// JSONPath to extract the token from the response
    pub token_path: String,
    /// Where to place the token in the next request
    pub placement: TokenPlacement,
}

impl PageTokenPaginator {
    /// Create a new page-token paginator
    pub fn new(token_path: impl Into<String>, placement: TokenPlacement) -> Self {
        Self {
            token_path: token_path.into(),
            placement,
        }
    }

    /// Paginator for `googleAds:search`: `$.nextPageToken` echoed as body field `pageToken`
    pub fn search() -> Self {
        Self::new(
            NEXT_PAGE_TOKEN_PATH,
            TokenPlacement::Body("pageToken".to_string()),
        )
    }
}

impl Paginator for PageTokenPaginator {
    fn placement(&self) -> Option<&TokenPlacement> {
        Some(&self.placement)
    }

    fn next_page(&self, _previous_token: Option<&str>, body: &Value) -> NextPage {
        match extract_jsonpath(body, &self.token_path) {
            Some(token) if !token.is_empty() => NextPage::with_token(token),
            _ => NextPage::Done,
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// Single-page endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn placement(&self) -> Option<&TokenPlacement> {
        None
    }

    fn next_page(&self, _previous_token: Option<&str>, _body: &Value) -> NextPage {
        NextPage::Done
    }
}

/// Build a paginator from its configuration
pub fn create_paginator(config: &PaginationConfig) -> Box<dyn Paginator> {
    match config {
        PaginationConfig::None => Box::new(NoPaginator),
        PaginationConfig::PageToken {
            token_path,
            placement,
        } => Box::new(PageTokenPaginator::new(token_path, placement.clone())),
    }
}
