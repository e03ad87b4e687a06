//! HTTP configuration

use fraudload_config::HttpConfig as ConfigHttpConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify SSL certificates
    pub verify_ssl: bool,

    /// Maximum idle connections kept per host
    pub max_idle_per_host: usize,
}

impl HttpConfig {
    /// Client settings for the identity provider.
    ///
    /// Certificates are always verified here regardless of what the target
    /// connection is configured to do.
    pub fn for_identity_provider(config: &ConfigHttpConfig) -> Self {
        Self {
            timeout: config.token_timeout,
            user_agent: config.user_agent.clone(),
            verify_ssl: true,
            max_idle_per_host: 1,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("fraudload/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_ssl: true,
            max_idle_per_host: 64,
        }
    }
}

impl From<ConfigHttpConfig> for HttpConfig {
    fn from(config: ConfigHttpConfig) -> Self {
        Self {
            timeout: config.timeout,
            user_agent: config.user_agent,
            verify_ssl: config.verify_ssl,
            max_idle_per_host: config.max_idle_per_host,
        }
    }
}
