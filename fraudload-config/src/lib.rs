//! Domain-driven configuration for the fraud engine load generator
//!
//! Configuration is split by functional domain (identity provider, target
//! service, HTTP client, logging, run shape), loaded from the environment
//! variables the traffic script has always honoured, or from a YAML file,
//! and validated before anything touches the network.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    auth::AuthConfig, http::HttpConfig, logging::LoggingConfig, run::RunConfig, run::UserType,
    target::TargetConfig, LoadTestConfig,
};

// Re-export utilities
pub use domains::utils::{parse_truthy, serde_duration, serde_duration_ms};
