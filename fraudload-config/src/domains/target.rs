//! Service-under-test configuration

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Where evaluation traffic is sent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the fraud rule engine (`TARGET_HOST`)
    #[serde(default = "default_host")]
    pub host: String,
}

impl TargetConfig {
    /// Absolute URL for a path on the target
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.host, "host", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_host() -> String {
    "http://localhost:8081".to_string()
}
