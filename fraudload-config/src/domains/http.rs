//! HTTP client configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_IDLE_PER_HOST: usize = 64;

/// Client settings shared by the target and the identity provider.
///
/// `verify_ssl` applies to the target only; the token exchange always
/// verifies certificates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request limit for evaluation and preload calls
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub timeout: Duration,

    #[serde(with = "crate::domains::utils::serde_duration")]
    pub token_timeout: Duration,

    pub user_agent: String,

    /// Verify the target certificate
    pub verify_ssl: bool,

    pub max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            token_timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("fraudload/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_ssl: false,
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (name, timeout) in [("timeout", self.timeout), ("token_timeout", self.token_timeout)] {
            if timeout.is_zero() {
                return Err(self.validation_error(format!("{} must be greater than zero", name)));
            }
        }
        if self.user_agent.trim().is_empty() {
            return Err(self.validation_error("user_agent cannot be empty"));
        }
        validate_positive(self.max_idle_per_host, "max_idle_per_host", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}
