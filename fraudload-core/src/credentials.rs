//! Shared bearer token for the whole run
//!
//! The provider performs one client-credentials exchange the first time a
//! token is asked for and hands the same token to every virtual user after
//! that. Concurrent first callers wait on the same exchange instead of
//! starting their own. The token is never refreshed; `expires_in` is only
//! logged.

use crate::errors::CredentialError;
use fraudload_config::AuthConfig;
use fraudload_http::{HttpClient, HttpConfig, HttpManager};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Token endpoint response. Only `access_token` is required.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    /// Informational only; any JSON type is accepted
    #[serde(default)]
    expires_in: Option<JsonValue>,
}

/// Lazily fetched, process-wide bearer token
pub struct CredentialProvider {
    config: AuthConfig,
    http: Arc<dyn HttpClient>,
    token: OnceCell<String>,
}

impl CredentialProvider {
    /// Create a provider that talks to the identity provider through `http`
    pub fn new(config: AuthConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            token: OnceCell::new(),
        }
    }

    /// Create a provider with its own identity-provider HTTP client
    pub fn from_config(
        config: AuthConfig,
        http_config: &fraudload_config::HttpConfig,
    ) -> Result<Self, CredentialError> {
        let manager = HttpManager::with_config(HttpConfig::for_identity_provider(http_config))?;
        Ok(Self::new(config, Arc::new(manager)))
    }

    /// Whether this run authenticates at all
    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    pub fn auth_config(&self) -> &AuthConfig {
        &self.config
    }

    /// The token, if one has already been fetched
    pub fn cached(&self) -> Option<&str> {
        self.token.get().map(String::as_str)
    }

    /// Get the shared token, fetching it on first use.
    ///
    /// Returns `Ok(None)` when authentication is disabled; no request is made
    /// in that case. A failed fetch leaves nothing cached.
    pub async fn get_token(&self) -> Result<Option<String>, CredentialError> {
        if !self.config.is_enabled() {
            return Ok(None);
        }

        let token = self
            .token
            .get_or_try_init(|| self.fetch_token())
            .await?;
        Ok(Some(token.clone()))
    }

    async fn fetch_token(&self) -> Result<String, CredentialError> {
        let missing = self.config.missing_credentials();
        if !missing.is_empty() {
            return Err(CredentialError::MissingConfiguration { missing });
        }

        let url = self.config.token_endpoint();
        let payload = json!({
            "grant_type": "client_credentials",
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
            "audience": self.config.audience,
        });

        debug!("Requesting client-credentials token from {}", url);
        let response = self.http.post_json(&url, &payload, None).await?;

        if !response.is_success() {
            return Err(CredentialError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        let parsed: TokenResponse = response
            .json()
            .map_err(CredentialError::MalformedResponse)?;

        let token = parsed
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::MissingAccessToken)?;

        let expires = match parsed.expires_in {
            None | Some(JsonValue::Null) => "unknown".to_string(),
            Some(JsonValue::String(s)) => s,
            Some(other) => other.to_string(),
        };
        info!(
            "Auth0 token cached (expires in {}s) - shared by all users",
            expires
        );

        Ok(token)
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("config", &self.config)
            .field("token_cached", &self.token.initialized())
            .finish()
    }
}
