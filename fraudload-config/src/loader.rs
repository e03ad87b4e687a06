//! Configuration loading and environment variable handling

use crate::domains::logging::{LogFormat, LogLevel};
use crate::domains::run::UserType;
use crate::domains::utils::parse_truthy;
use crate::domains::LoadTestConfig;
use crate::error::{ConfigError, ConfigResult};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Variables the traffic script has always read without a prefix
pub const ENV_NO_AUTH: &str = "NO_AUTH";
pub const ENV_AUTH0_DOMAIN: &str = "AUTH0_DOMAIN";
pub const ENV_AUTH0_CLIENT_ID: &str = "AUTH0_CLIENT_ID";
pub const ENV_AUTH0_CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";
pub const ENV_AUTH0_AUDIENCE: &str = "AUTH0_AUDIENCE";
pub const ENV_TARGET_HOST: &str = "TARGET_HOST";

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Prefix for the tuning variables (`{prefix}_HTTP_TIMEOUT`, ...)
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "FRAUDLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<LoadTestConfig> {
        let config = self.read(Some(path))?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<LoadTestConfig> {
        let config = self.read(None::<&Path>)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<LoadTestConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Read file and environment without validating.
    ///
    /// For callers that layer further overrides (command-line flags) on top
    /// and call [`LoadTestConfig::validate_all`] themselves.
    pub fn read(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<LoadTestConfig> {
        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content)?
            }
            None => LoadTestConfig::default(),
        };

        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    fn apply_env_overrides(&self, config: &mut LoadTestConfig) -> ConfigResult<()> {
        // Unprefixed names, shared with the deployment scripts
        if let Some(no_auth) = env_value(ENV_NO_AUTH) {
            config.auth.disabled = parse_truthy(&no_auth);
        }
        for (name, field) in [
            (ENV_AUTH0_DOMAIN, &mut config.auth.domain),
            (ENV_AUTH0_CLIENT_ID, &mut config.auth.client_id),
            (ENV_AUTH0_CLIENT_SECRET, &mut config.auth.client_secret),
            (ENV_AUTH0_AUDIENCE, &mut config.auth.audience),
            (ENV_TARGET_HOST, &mut config.target.host),
        ] {
            if let Some(value) = env_value(name) {
                *field = value;
            }
        }

        // Prefixed tuning knobs
        if let Some(secs) = self.parse_env::<u64>("HTTP_TIMEOUT")? {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(verify) = env_value(&self.prefixed("HTTP_VERIFY_SSL")) {
            config.http.verify_ssl = parse_truthy(&verify);
        }
        if let Some(level) = self.parse_env::<LogLevel>("LOG_LEVEL")? {
            config.logging.level = level;
        }
        if let Some(format) = self.parse_env::<LogFormat>("LOG_FORMAT")? {
            config.logging.format = format;
        }
        if let Some(users) = self.parse_env("USERS")? {
            config.run.users = users;
        }
        if let Some(rate) = self.parse_env("SPAWN_RATE")? {
            config.run.spawn_rate = rate;
        }
        if let Some(secs) = self.parse_env::<u64>("RUN_TIME")? {
            config.run.run_time = Duration::from_secs(secs);
        }
        if let Some(user_type) = self.parse_env::<UserType>("USER_TYPE")? {
            config.run.user_type = user_type;
        }

        Ok(())
    }

    fn prefixed(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    /// Parse `{prefix}_{name}` if it is set
    fn parse_env<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let name = self.prefixed(name);
        match env_value(&name) {
            None => Ok(None),
            Some(value) => match value.trim().parse() {
                Ok(parsed) => Ok(Some(parsed)),
                Err(e) => Err(ConfigError::InvalidEnv {
                    reason: e.to_string(),
                    name,
                    value,
                }),
            },
        }
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
