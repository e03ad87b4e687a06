//! Configuration error types

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An environment variable is set but its value does not parse
    #[error("Invalid {name}={value:?}: {reason}")]
    InvalidEnv {
        name: String,
        value: String,
        reason: String,
    },

    /// A loaded value breaks a rule of its configuration domain
    #[error("Invalid {domain} configuration: {message}")]
    DomainError { domain: String, message: String },
}
