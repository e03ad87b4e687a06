//! Domain-specific configuration modules

pub mod auth;
pub mod http;
pub mod logging;
pub mod run;
pub mod target;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Complete load test configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoadTestConfig {
    /// Identity provider (client-credentials) configuration
    #[serde(default)]
    pub auth: auth::AuthConfig,

    /// Service under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Shape of the run: users, spawn rate, duration, behavior
    #[serde(default)]
    pub run: run::RunConfig,
}

impl LoadTestConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.auth.validate()?;
        self.target.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        self.run.validate()?;
        Ok(())
    }

    /// Copy of this configuration that is safe to print
    pub fn redacted(&self) -> Self {
        Self {
            auth: self.auth.redacted(),
            ..self.clone()
        }
    }

    /// Render the effective configuration as YAML with secrets masked
    pub fn to_redacted_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(&self.redacted())?)
    }
}
