//! Virtual user: executes one behavior against the target

use crate::behavior::{TaskSpec, UserBehavior};
use crate::classify::{classify, Classification, FailureKind};
use crate::credentials::CredentialProvider;
use crate::errors::CredentialError;
use crate::lifecycle::SlowRequestLogger;
use crate::stats::RunStats;
use fraudload_config::TargetConfig;
use fraudload_http::HttpClient;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of one request issued by a virtual user
#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// Statistics name of the task
    pub name: String,
    /// Path the request went to
    pub endpoint: String,
    pub classification: Classification,
    pub elapsed: Duration,
    pub response_length: usize,
}

/// One simulated client
pub struct VirtualUser {
    id: usize,
    behavior: Arc<UserBehavior>,
    http: Arc<dyn HttpClient>,
    target: TargetConfig,
    bearer_token: Option<String>,
    stats: RunStats,
    slow_requests: SlowRequestLogger,
    rng: StdRng,
}

impl VirtualUser {
    /// Create a user, resolving its credential from the shared provider.
    ///
    /// The token is read once here and reused for every request this user
    /// makes.
    pub async fn new(
        id: usize,
        behavior: Arc<UserBehavior>,
        http: Arc<dyn HttpClient>,
        target: TargetConfig,
        credentials: &CredentialProvider,
        stats: RunStats,
        slow_requests: SlowRequestLogger,
    ) -> Result<Self, CredentialError> {
        let bearer_token = credentials.get_token().await?;

        Ok(Self {
            id,
            behavior,
            http,
            target,
            bearer_token,
            stats,
            slow_requests,
            rng: StdRng::from_entropy(),
        })
    }

    /// Replace the random source, e.g. with a seeded one
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn behavior(&self) -> &UserBehavior {
        &self.behavior
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Issue one request for `task`, classify it and record it
    pub async fn run_task(&mut self, task: &TaskSpec) -> RequestRecord {
        let body = task.generator.generate(&mut self.rng);
        let url = self.target.url_for(task.endpoint);

        let started = Instant::now();
        let record = match self
            .http
            .post_json(&url, &body, self.bearer_token.as_deref())
            .await
        {
            Ok(response) => RequestRecord {
                name: task.name.to_string(),
                endpoint: task.endpoint.to_string(),
                classification: classify(&response),
                elapsed: response.elapsed,
                response_length: response.len(),
            },
            Err(e) => RequestRecord {
                name: task.name.to_string(),
                endpoint: task.endpoint.to_string(),
                classification: Classification::Failure(FailureKind::Transport(e.to_string())),
                elapsed: started.elapsed(),
                response_length: 0,
            },
        };

        if let Some(failure) = record.classification.failure() {
            debug!(user = self.id, "{} failed: {}", record.name, failure);
        }
        self.slow_requests.observe(&record.name, record.elapsed);
        self.stats.record(&record).await;

        record
    }

    /// Pick a weighted task and run it
    pub async fn step(&mut self) -> Option<RequestRecord> {
        let behavior = Arc::clone(&self.behavior);
        let task = behavior.pick_task(&mut self.rng)?;
        Some(self.run_task(task).await)
    }

    /// Run the behavior loop until `deadline`; returns the number of requests made
    pub async fn run_until(&mut self, deadline: tokio::time::Instant) -> u64 {
        let mut requests = 0;

        while tokio::time::Instant::now() < deadline {
            if self.step().await.is_none() {
                warn!(user = self.id, "Behavior {} has no runnable tasks", self.behavior.user_type);
                break;
            }
            requests += 1;

            let now = tokio::time::Instant::now();
            if now >= deadline {
                break;
            }
            let wait = self.behavior.pacing.next_wait(&mut self.rng);
            tokio::time::sleep(wait.min(deadline - now)).await;
        }

        debug!(user = self.id, "Finished after {} requests", requests);
        requests
    }
}

impl std::fmt::Debug for VirtualUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualUser")
            .field("id", &self.id)
            .field("user_type", &self.behavior.user_type)
            .field("target", &self.target.host)
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Pacing, AUTH_ENDPOINT, MONITORING_ENDPOINT};
    use fraudload_config::{AuthConfig, UserType};
    use fraudload_http::{HttpError, HttpResponse};
    use serde_json::Value as JsonValue;
    use tokio::sync::Mutex;

    /// Target stand-in that replays one response and remembers what it saw
    struct FakeTarget {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<(String, JsonValue, Option<String>)>>,
    }

    impl FakeTarget {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for FakeTarget {
        async fn post_json(
            &self,
            url: &str,
            body: &JsonValue,
            bearer_token: Option<&str>,
        ) -> Result<HttpResponse, HttpError> {
            self.seen.lock().await.push((
                url.to_string(),
                body.clone(),
                bearer_token.map(str::to_string),
            ));
            Ok(HttpResponse {
                status: self.status,
                body: self.body.to_string(),
                elapsed: Duration::from_millis(2),
            })
        }
    }

    /// Target that is never reachable
    struct Unreachable;

    #[async_trait::async_trait]
    impl HttpClient for Unreachable {
        async fn post_json(
            &self,
            url: &str,
            _body: &JsonValue,
            _bearer_token: Option<&str>,
        ) -> Result<HttpResponse, HttpError> {
            Err(HttpError::InvalidUrl(url.to_string()))
        }
    }

    async fn user(behavior: UserBehavior, http: Arc<dyn HttpClient>, stats: RunStats) -> VirtualUser {
        let credentials = CredentialProvider::new(AuthConfig::disabled(), Arc::new(Unreachable));
        VirtualUser::new(
            1,
            Arc::new(behavior),
            http,
            TargetConfig::default(),
            &credentials,
            stats,
            SlowRequestLogger::default(),
        )
        .await
        .unwrap()
        .with_rng(StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_run_task_posts_generated_body() {
        let target = FakeTarget::new(200, r#"{"engine_mode":"NORMAL"}"#);
        let stats = RunStats::new();
        let mut user = user(UserBehavior::standard(), target.clone(), stats.clone()).await;

        let record = user.run_task(&TaskSpec::monitoring(1)).await;
        assert!(record.classification.is_success());
        assert_eq!(record.name, MONITORING_ENDPOINT);

        let seen = target.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "http://localhost:8081/v1/evaluate/monitoring");
        assert!(seen[0].1.get("decision").is_some());
        assert_eq!(seen[0].2, None);
        assert_eq!(stats.total_requests(), 1);
    }

    #[tokio::test]
    async fn test_velocity_task_uses_auth_endpoint_and_own_name() {
        let target = FakeTarget::new(200, "{}");
        let mut user = user(UserBehavior::velocity(), target.clone(), RunStats::new()).await;

        let record = user.run_task(&TaskSpec::velocity_burst(1)).await;
        assert_eq!(record.name, "/v1/evaluate/auth [velocity]");
        assert_eq!(record.endpoint, AUTH_ENDPOINT);

        let seen = target.seen.lock().await;
        assert_eq!(seen[0].1["card_hash"], "velocity_test_card");
    }

    #[tokio::test]
    async fn test_degraded_response_recorded_as_failure() {
        let target = FakeTarget::new(200, r#"{"engine_mode":"FAIL_OPEN","engine_error_code":"E42"}"#);
        let stats = RunStats::new();
        let mut user = user(UserBehavior::steady_state(), target, stats.clone()).await;

        let record = user.step().await.unwrap();
        assert_eq!(record.classification.failure().unwrap().to_string(), "FAIL_OPEN: E42");
        assert_eq!(stats.total_failures(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_a_classified_failure() {
        let stats = RunStats::new();
        let mut user = user(UserBehavior::steady_state(), Arc::new(Unreachable), stats.clone()).await;

        let record = user.step().await.unwrap();
        assert!(matches!(
            record.classification,
            Classification::Failure(FailureKind::Transport(_))
        ));
        assert_eq!(stats.total_failures(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_honours_constant_pacing() {
        let target = FakeTarget::new(200, "{}");
        let behavior = UserBehavior {
            user_type: UserType::SteadyState,
            pacing: Pacing::constant_millis(100),
            tasks: vec![TaskSpec::auth(1)],
        };
        let mut user = user(behavior, target.clone(), RunStats::new()).await;

        let deadline = tokio::time::Instant::now() + Duration::from_millis(450);
        let requests = user.run_until(deadline).await;

        // t = 0, 100, 200, 300, 400
        assert_eq!(requests, 5);
        assert_eq!(target.seen.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn test_run_until_stops_without_tasks() {
        let target = FakeTarget::new(200, "{}");
        let behavior = UserBehavior {
            tasks: vec![],
            ..UserBehavior::standard()
        };
        let mut user = user(behavior, target, RunStats::new()).await;

        let deadline = tokio::time::Instant::now() + Duration::from_secs(60);
        assert_eq!(user.run_until(deadline).await, 0);
    }
}
