//! Run shape: how many virtual users, how fast they arrive, for how long

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Virtual user behavior variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum UserType {
    /// Mixed AUTH/MONITORING traffic with short random pauses
    #[default]
    Standard,
    /// Same mix as standard with near-zero pauses
    HighVolume,
    /// Standard mix plus bursts against a single card
    Velocity,
    /// AUTH only at a fixed interval, for baselines
    SteadyState,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Standard => "standard",
            UserType::HighVolume => "high-volume",
            UserType::Velocity => "velocity",
            UserType::SteadyState => "steady-state",
        }
    }

    pub fn all() -> &'static [UserType] {
        &[
            UserType::Standard,
            UserType::HighVolume,
            UserType::Velocity,
            UserType::SteadyState,
        ]
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        UserType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("Invalid user type: {}", s))
    }
}

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of concurrent virtual users
    #[serde(default = "default_users")]
    pub users: usize,

    /// Users started per second until `users` are running
    #[serde(default = "default_spawn_rate")]
    pub spawn_rate: f64,

    /// Total run time
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_run_time"
    )]
    pub run_time: Duration,

    /// Behavior every virtual user runs
    #[serde(default)]
    pub user_type: UserType,

    /// Requests slower than this are logged individually
    #[serde(
        with = "crate::domains::utils::serde_duration_ms",
        default = "default_slow_request_threshold"
    )]
    pub slow_request_threshold: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            spawn_rate: default_spawn_rate(),
            run_time: default_run_time(),
            user_type: UserType::default(),
            slow_request_threshold: default_slow_request_threshold(),
        }
    }
}

impl Validatable for RunConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.users, "users", self.domain_name())?;
        validate_positive(self.spawn_rate, "spawn_rate", self.domain_name())?;
        if !self.spawn_rate.is_finite() {
            return Err(self.validation_error("spawn_rate must be finite"));
        }
        validate_positive(self.run_time.as_millis(), "run_time", self.domain_name())?;
        if self.run_time > MAX_RUN_TIME {
            return Err(self.validation_error(format!(
                "run_time must be at most {}s, got {}s",
                MAX_RUN_TIME.as_secs(),
                self.run_time.as_secs()
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "run"
    }
}

/// Upper bound on a single run (one year)
pub const MAX_RUN_TIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

fn default_users() -> usize {
    1
}

fn default_spawn_rate() -> f64 {
    1.0
}

fn default_run_time() -> Duration {
    Duration::from_secs(60)
}

fn default_slow_request_threshold() -> Duration {
    Duration::from_millis(50)
}
