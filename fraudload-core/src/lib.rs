//! Traffic generation for the card fraud rule engine
//!
//! The pieces a run is assembled from:
//! - [`credentials`]: one client-credentials token per process, fetched at most once
//! - [`payload`]: randomized AUTH, MONITORING and velocity-burst request bodies
//! - [`classify`]: turns an evaluation response into success or a labelled failure
//! - [`behavior`]: declarative virtual-user types (pacing plus weighted tasks)
//! - [`user`]: executes a behavior against the target and records each request
//! - [`lifecycle`]: start/stop hooks and slow-request logging
//! - [`runner`]: spawns virtual users on tokio and collects [`stats`]

pub mod behavior;
pub mod classify;
pub mod credentials;
pub mod errors;
pub mod lifecycle;
pub mod payload;
pub mod report;
pub mod runner;
pub mod stats;
pub mod user;

pub use behavior::{Pacing, TaskSpec, UserBehavior};
pub use classify::{classify, Classification, FailureKind};
pub use credentials::CredentialProvider;
pub use errors::{CredentialError, LifecycleError, PreloadError};
pub use lifecycle::{on_start, on_stop, SlowRequestLogger, StartupReport};
pub use payload::{CardNetwork, PayloadKind};
pub use runner::LoadRunner;
pub use stats::{RunStats, RunSummary};
pub use user::{RequestRecord, VirtualUser};
