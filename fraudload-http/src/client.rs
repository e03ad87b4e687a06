//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::HttpResponse;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Instant;
use tracing::{debug, trace};

/// HTTP client trait for the JSON POSTs every component issues
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// POST `body` as JSON to `url`, attaching `Authorization: Bearer` when a
    /// token is given. Any status code is a successful result; only transport
    /// problems are errors.
    async fn post_json(
        &self,
        url: &str,
        body: &JsonValue,
        bearer_token: Option<&str>,
    ) -> Result<HttpResponse, HttpError>;
}

/// Pooled HTTP client built from an [`HttpConfig`].
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpManager {
    client: Client,
}

impl HttpManager {
    /// Create a new HttpManager with default configuration
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HttpManager with specific configuration
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        debug!(
            "Creating HttpManager with timeout: {}s, verify_ssl: {}",
            config.timeout.as_secs(),
            config.verify_ssl
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpClient for HttpManager {
    async fn post_json(
        &self,
        url: &str,
        body: &JsonValue,
        bearer_token: Option<&str>,
    ) -> Result<HttpResponse, HttpError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", url, e)))?;

        trace!("Request body: {}", body);
        let mut request = self.client.post(parsed).json(body);

        if let Some(token) = bearer_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| HttpError::InvalidBearerToken)?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let elapsed = started.elapsed();

        debug!(
            "POST {} -> {} ({} bytes, {}ms)",
            url,
            status,
            body.len(),
            elapsed.as_millis()
        );

        Ok(HttpResponse {
            status,
            body,
            elapsed,
        })
    }
}
