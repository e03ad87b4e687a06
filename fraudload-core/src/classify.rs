//! Response classification for evaluation requests

use fraudload_http::HttpResponse;
use serde_json::Value as JsonValue;
use std::fmt;

pub const ENGINE_MODE_NORMAL: &str = "NORMAL";
pub const ENGINE_MODE_FAIL_OPEN: &str = "FAIL_OPEN";
pub const ENGINE_MODE_DEGRADED: &str = "DEGRADED";

/// Characters of an unexpected response body kept in the failure message
pub const BODY_EXCERPT_CHARS: usize = 100;

/// Why a request counts as failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// 200 but the engine answered from a fallback path
    Degraded { mode: String, error_code: String },
    /// 200 with a body that is not a JSON object
    InvalidJson,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// Any other non-200 status
    UnexpectedStatus { status: u16, body_excerpt: String },
    /// No response at all (timeout, refused connection, ...)
    Transport(String),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Degraded { mode, error_code } => write!(f, "{}: {}", mode, error_code),
            FailureKind::InvalidJson => write!(f, "Invalid JSON response"),
            FailureKind::Unauthorized => {
                write!(f, "Auth failed - check credentials or use NO_AUTH=true")
            }
            FailureKind::Forbidden => write!(f, "Forbidden - check scopes"),
            FailureKind::UnexpectedStatus {
                status,
                body_excerpt,
            } => write!(f, "Status {}: {}", status, body_excerpt),
            FailureKind::Transport(message) => write!(f, "Request error: {}", message),
        }
    }
}

/// Outcome of one evaluation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success,
    Failure(FailureKind),
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }

    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            Classification::Success => None,
            Classification::Failure(kind) => Some(kind),
        }
    }
}

/// Classify an evaluation response
pub fn classify(response: &HttpResponse) -> Classification {
    match response.status {
        200 => classify_body(&response.body),
        401 => Classification::Failure(FailureKind::Unauthorized),
        403 => Classification::Failure(FailureKind::Forbidden),
        status => Classification::Failure(FailureKind::UnexpectedStatus {
            status,
            body_excerpt: response.body_excerpt(BODY_EXCERPT_CHARS).to_string(),
        }),
    }
}

fn classify_body(body: &str) -> Classification {
    let data = match serde_json::from_str::<JsonValue>(body) {
        Ok(JsonValue::Object(map)) => map,
        _ => return Classification::Failure(FailureKind::InvalidJson),
    };

    let mode = data
        .get("engine_mode")
        .and_then(JsonValue::as_str)
        .unwrap_or(ENGINE_MODE_NORMAL);

    if mode == ENGINE_MODE_FAIL_OPEN || mode == ENGINE_MODE_DEGRADED {
        let error_code = match data.get("engine_error_code") {
            Some(JsonValue::String(code)) => code.clone(),
            Some(JsonValue::Null) | None => "UNKNOWN".to_string(),
            Some(other) => other.to_string(),
        };
        return Classification::Failure(FailureKind::Degraded {
            mode: mode.to_string(),
            error_code,
        });
    }

    Classification::Success
}
