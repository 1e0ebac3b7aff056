use axum::{
    extract::State,
    http::{Method, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    bot_user_id: String,
    root_folder_id: String,
    started_at: DateTime<Utc>,
}

impl HealthState {
    pub fn new(bot_user_id: impl Into<String>, root_folder_id: impl Into<String>) -> Self {
        Self {
            bot_user_id: bot_user_id.into(),
            root_folder_id: root_folder_id.into(),
            started_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub slack: HealthCheck,
    pub drive: HealthCheck,
    pub uptime_secs: i64,
    pub checked_at: String,
}

/// `/health` plus the keep-alive fallback: any other GET answers `running`.
pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).fallback(keep_alive).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let now = Utc::now();
    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: "docbrowse-server accepting slack requests".to_string(),
        },
        slack: HealthCheck {
            status: "ready",
            detail: format!("authenticated as {}", state.bot_user_id),
        },
        drive: HealthCheck {
            status: "ready",
            detail: format!("browsing folder {}", state.root_folder_id),
        },
        uptime_secs: (now - state.started_at).num_seconds(),
        checked_at: now.to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

async fn keep_alive(method: Method) -> (StatusCode, &'static str) {
    if method == Method::GET {
        (StatusCode::OK, "running")
    } else {
        (StatusCode::NOT_FOUND, "not found")
    }
}
