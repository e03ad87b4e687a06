//! HTTP error types

/// Transport-level failure. A response with any status code is not an error.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL {0}")]
    InvalidUrl(String),

    #[error("bearer token is not a valid header value")]
    InvalidBearerToken,
}

