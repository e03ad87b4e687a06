//! Error types for the fatal paths of a run.
//!
//! Per-request failures are not errors; they are
//! [`Classification`](crate::classify::Classification) values.

use fraudload_config::ConfigError;
use fraudload_http::HttpError;
use thiserror::Error;

/// Failure to obtain the shared bearer token. Always fatal.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(
        "Auth0 env vars not set and NO_AUTH is not true (missing: {}). \
         Set NO_AUTH=true for no-auth mode, or provide AUTH0_DOMAIN, AUTH0_CLIENT_ID, \
         AUTH0_CLIENT_SECRET and AUTH0_AUDIENCE",
        .missing.join(", ")
    )]
    MissingConfiguration { missing: Vec<&'static str> },

    #[error("Auth0 token fetch failed: {0}")]
    Transport(#[from] HttpError),

    #[error("Auth0 token fetch failed: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Auth0 token fetch failed: malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("No access_token in Auth0 response")]
    MissingAccessToken,
}

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("HTTP client setup failed: {0}")]
    Http(#[from] HttpError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Virtual user task failed: {0}")]
    UserTask(#[from] tokio::task::JoinError),
}

/// Why the startup ruleset preload did not go through. Never fatal.
#[derive(Debug, Error)]
pub enum PreloadError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Json(#[from] serde_json::Error),
}
