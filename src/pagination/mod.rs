//! Pagination module
//!
//! Supports: page token (response envelope), single page
//!
//! # Overview
//!
//! A paginator is stateless apart from the page it was just shown: it reads
//! the continuation token from the envelope and reports `Continue` or
//! `Done`. The caller carries the token between requests.

mod strategies;
mod types;

pub use strategies::{create_paginator, NoPaginator, PageTokenPaginator, NEXT_PAGE_TOKEN_PATH};
pub use types::{
    extract_jsonpath, NextPage, PaginationConfig, Paginator, TokenPlacement,
};
