//! tokio host for virtual users
//!
//! Runs the start hook, ramps users up at the configured spawn rate, lets
//! them loop until the run time is over, then runs the stop hook and
//! returns the collected statistics.

use crate::behavior::UserBehavior;
use crate::credentials::CredentialProvider;
use crate::errors::{CredentialError, LifecycleError};
use crate::lifecycle::{on_start, on_stop, SlowRequestLogger};
use crate::stats::{RunStats, RunSummary};
use crate::user::VirtualUser;
use fraudload_config::{ConfigError, LoadTestConfig};
use fraudload_http::{HttpClient, HttpManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

pub struct LoadRunner {
    config: LoadTestConfig,
    http: Arc<dyn HttpClient>,
    credentials: Arc<CredentialProvider>,
    stats: RunStats,
}

impl LoadRunner {
    /// Build a runner with real HTTP clients for the target and the identity provider
    pub fn new(config: LoadTestConfig) -> Result<Self, LifecycleError> {
        config.validate_all()?;

        let http = HttpManager::with_config(config.http.clone().into())?;
        let credentials = CredentialProvider::from_config(config.auth.clone(), &config.http)?;

        Ok(Self::with_clients(
            config,
            Arc::new(http),
            Arc::new(credentials),
        ))
    }

    /// Build a runner around existing clients
    pub fn with_clients(
        config: LoadTestConfig,
        http: Arc<dyn HttpClient>,
        credentials: Arc<CredentialProvider>,
    ) -> Self {
        Self {
            config,
            http,
            credentials,
            stats: RunStats::new(),
        }
    }

    pub fn config(&self) -> &LoadTestConfig {
        &self.config
    }

    /// Live statistics handle
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Gap between two user spawns, never longer than the run itself
    fn spawn_interval(&self) -> Duration {
        let run = &self.config.run;
        if run.spawn_rate > 0.0 && run.spawn_rate.is_finite() {
            Duration::try_from_secs_f64(1.0 / run.spawn_rate)
                .map_or(run.run_time, |interval| interval.min(run.run_time))
        } else {
            Duration::ZERO
        }
    }

    /// When users stop issuing requests
    fn deadline(&self, from: tokio::time::Instant) -> Result<tokio::time::Instant, LifecycleError> {
        from.checked_add(self.config.run.run_time).ok_or_else(|| {
            ConfigError::DomainError {
                domain: "run".to_string(),
                message: format!(
                    "run_time of {}s is out of range",
                    self.config.run.run_time.as_secs()
                ),
            }
            .into()
        })
    }

    /// Execute one complete run
    pub async fn run(&self) -> Result<RunSummary, LifecycleError> {
        let startup = on_start(&self.config, &self.credentials, self.http.as_ref()).await?;
        debug!("Startup finished: {:?}", startup);

        let run = &self.config.run;
        let behavior = Arc::new(UserBehavior::for_type(run.user_type));
        let slow_requests = SlowRequestLogger::new(run.slow_request_threshold);
        let deadline = self.deadline(tokio::time::Instant::now())?;
        let interval = self.spawn_interval();
        self.stats.restart_clock().await;

        info!(
            "Spawning {} {} user(s) at {}/s for {}s",
            run.users,
            run.user_type,
            run.spawn_rate,
            run.run_time.as_secs()
        );

        let mut handles: Vec<JoinHandle<Result<u64, CredentialError>>> =
            Vec::with_capacity(run.users);

        for id in 0..run.users {
            if tokio::time::Instant::now() >= deadline {
                break;
            }
            if id > 0 && !interval.is_zero() {
                let next = tokio::time::Instant::now()
                    .checked_add(interval)
                    .map_or(deadline, |next| next.min(deadline));
                tokio::time::sleep_until(next).await;
            }

            let behavior = Arc::clone(&behavior);
            let http = Arc::clone(&self.http);
            let credentials = Arc::clone(&self.credentials);
            let target = self.config.target.clone();
            let stats = self.stats.clone();

            handles.push(tokio::spawn(async move {
                let mut user = VirtualUser::new(
                    id,
                    behavior,
                    http,
                    target,
                    &credentials,
                    stats,
                    slow_requests,
                )
                .await?;
                Ok::<_, CredentialError>(user.run_until(deadline).await)
            }));
        }

        info!("All {} user(s) spawned", handles.len());

        let mut first_error: Option<LifecycleError> = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(requests)) => debug!("User finished with {} requests", requests),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e.into());
                }
                Err(e) => {
                    error!("Virtual user task failed: {}", e);
                    first_error.get_or_insert(e.into());
                }
            }
        }

        on_stop();

        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(self.stats.summary().await)
    }
}

impl std::fmt::Debug for LoadRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadRunner")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .finish()
    }
}
