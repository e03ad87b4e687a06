//! Logging setup for the load generator
//!
//! Everything in the workspace logs through `tracing`; this crate owns the
//! one place a subscriber gets installed.

pub mod init;

pub use init::{build_env_filter, init_logging};
