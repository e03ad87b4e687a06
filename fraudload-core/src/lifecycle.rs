//! Run start/stop hooks and per-request slow logging

use crate::behavior::RULESET_BULK_LOAD_ENDPOINT;
use crate::credentials::CredentialProvider;
use crate::errors::{LifecycleError, PreloadError};
use fraudload_config::{LoadTestConfig, TargetConfig};
use fraudload_http::HttpClient;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;
use tracing::{info, warn};

const RULE: &str = "============================================================";

/// Rulesets the engine needs before evaluation traffic makes sense
pub const PRELOAD_RULESETS: &[(&str, u32, &str)] = &[
    ("CARD_AUTH", 1, "global"),
    ("CARD_MONITORING", 1, "global"),
];

/// Counts reported by the bulk-load endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PreloadSummary {
    #[serde(default)]
    pub loaded: u64,
    #[serde(default)]
    pub requested: u64,
}

/// What `on_start` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    /// A bearer token is cached and will be sent
    pub token_acquired: bool,
    /// `None` when the preload failed and the run uses whatever is loaded
    pub preload: Option<PreloadSummary>,
}

/// Banner lines printed at run start
pub fn startup_banner(config: &LoadTestConfig) -> Vec<String> {
    let mut lines = vec![
        RULE.to_string(),
        "Card Fraud Rule Engine Load Test".to_string(),
        format!(
            "  Mode: {}",
            if config.auth.is_enabled() { "JWT" } else { "NO-AUTH" }
        ),
        format!("  Target: {}", config.target.host),
        format!(
            "  Users: {} ({}, spawn rate {}/s, run time {}s)",
            config.run.users,
            config.run.user_type,
            config.run.spawn_rate,
            config.run.run_time.as_secs()
        ),
    ];
    if config.auth.is_enabled() {
        lines.push(format!("  Auth0: {}", config.auth.display_domain()));
    }
    lines.push(RULE.to_string());
    lines
}

/// Body for the bulk-load request
pub fn ruleset_preload_payload() -> JsonValue {
    let rulesets: Vec<JsonValue> = PRELOAD_RULESETS
        .iter()
        .map(|(key, version, country)| {
            json!({ "key": key, "version": version, "country": country })
        })
        .collect();
    json!({ "rulesets": rulesets })
}

/// Ask the target to load the rulesets the traffic exercises
pub async fn preload_rulesets(
    http: &dyn HttpClient,
    target: &TargetConfig,
    bearer_token: Option<&str>,
) -> Result<PreloadSummary, PreloadError> {
    let url = target.url_for(RULESET_BULK_LOAD_ENDPOINT);
    let response = http
        .post_json(&url, &ruleset_preload_payload(), bearer_token)
        .await?;

    if !response.is_success() {
        return Err(PreloadError::Status {
            status: response.status,
            body: response.body_excerpt(200).to_string(),
        });
    }

    Ok(response.json()?)
}

/// Start-of-run hook.
///
/// Prints the banner, resolves the shared token (fatal on failure) and
/// preloads rulesets (a warning on failure).
pub async fn on_start(
    config: &LoadTestConfig,
    credentials: &CredentialProvider,
    http: &dyn HttpClient,
) -> Result<StartupReport, LifecycleError> {
    let banner = startup_banner(config);
    let (body, closing) = banner.split_at(banner.len() - 1);
    for line in body {
        info!("{}", line);
    }

    let token = credentials.get_token().await?;

    let preload = match preload_rulesets(http, &config.target, token.as_deref()).await {
        Ok(summary) => {
            info!(
                "  Rulesets loaded: {} / {}",
                summary.loaded, summary.requested
            );
            Some(summary)
        }
        Err(e) => {
            warn!("  Warning: Could not load rulesets: {}", e);
            warn!("  Load test will proceed with existing rulesets (if any)");
            None
        }
    };

    for line in closing {
        info!("{}", line);
    }

    Ok(StartupReport {
        token_acquired: token.is_some(),
        preload,
    })
}

/// End-of-run hook
pub fn on_stop() {
    info!("{}", RULE);
    info!("Load Test Complete");
    info!("{}", RULE);
}

/// Logs individual requests that take longer than a threshold
#[derive(Debug, Clone, Copy)]
pub struct SlowRequestLogger {
    threshold: Duration,
}

impl SlowRequestLogger {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Log the request if it was slow; returns whether it was
    pub fn observe(&self, name: &str, elapsed: Duration) -> bool {
        if elapsed > self.threshold {
            warn!("SLOW: {} {}ms", name, elapsed.as_millis());
            true
        } else {
            false
        }
    }
}

impl Default for SlowRequestLogger {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
