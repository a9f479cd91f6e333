//! HTTP client module
//!
//! Provides the HTTP client used by [`crate::source::ApiSource`].
//!
//! # Features
//!
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Status Mapping**: Non-success responses become [`crate::Error::HttpStatus`]

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
