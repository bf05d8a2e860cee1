//! HTTP layer
//!
//! Builds Google Ads API requests from stream definitions and sends them.
//!
//! # Features
//!
//! - **Transport seam**: `Transport` trait, reqwest-backed `HttpClient`
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Request execution**: header set, GAQL body, page tokens, status classification

mod client;
mod executor;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use executor::{ExecutorConfig, Page, RequestExecutor, DEFAULT_API_URL};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{ApiRequest, ApiResponse, Transport};
