//! HTTP client functionality for the load generator
//!
//! One pooled `reqwest` client per destination, JSON request bodies, and a
//! response type that keeps the raw body around so callers can classify
//! failures without a second read.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

// Re-export main types for convenience
pub use client::{HttpClient, HttpManager};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::HttpResponse;
