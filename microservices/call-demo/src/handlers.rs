//! HTTP handlers for the demo call page

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use streamcall_api_sdk::TokenStore;
use streamcall_core::{
    CallType, DependencyStatus, HealthStatus, OpponentId, ReadinessStatus, StreamcallService,
};
use streamcall_rtc_sdk::RenderTarget;
use streamcall_session::{resolve_app_id, CallView, MetricsSnapshot, SessionController};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

pub struct AppState {
    pub controller: Arc<SessionController>,
    pub tokens: Arc<dyn TokenStore>,
    pub app_id: Option<String>,
    pub default_opponent: OpponentId,
    running: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    pub fn new(
        controller: Arc<SessionController>,
        tokens: Arc<dyn TokenStore>,
        app_id: Option<String>,
        default_opponent: OpponentId,
    ) -> Self {
        Self {
            controller,
            tokens,
            app_id,
            default_opponent,
            running: Mutex::new(None),
        }
    }

    /// Start a call sequence in the background; a running one is replaced
    pub fn launch(&self, opponent: OpponentId, call_type: CallType) {
        let controller = self.controller.clone();
        let handle = tokio::spawn(async move {
            match controller.start_call(opponent, call_type).await {
                Ok(report) => info!(
                    phase = ?report.phase,
                    ticks = report.ticks,
                    joined = report.joined(),
                    "Call sequence finished"
                ),
                Err(e) => warn!(
                    error = %e,
                    code = e.error_code(),
                    status = e.status_code(),
                    "Call sequence failed"
                ),
            }
        });

        // the controller cancels the previous attempt itself; the old task
        // winds down on its own
        *self.running.lock() = Some(handle);
    }

    /// Cancel the running sequence and wait until it has wound down
    pub async fn stop(&self) {
        self.controller.cancel().await;
        let handle = self.running.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Call sequence task failed");
            }
        }
    }

    pub fn readiness(&self) -> ReadinessStatus {
        let app_id_ok = resolve_app_id(self.app_id.as_deref()).is_ok();
        let token_ok = self.tokens.token().is_some();

        ReadinessStatus {
            ready: app_id_ok && token_ok,
            dependencies: vec![
                DependencyStatus {
                    name: "app_id".to_string(),
                    available: app_id_ok,
                    latency_ms: None,
                },
                DependencyStatus {
                    name: "auth_token".to_string(),
                    available: token_ok,
                    latency_ms: None,
                },
            ],
        }
    }
}

/// Liveness and readiness, answered by the service itself
pub fn health_router<S: StreamcallService>(service: Arc<S>) -> Router {
    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/ready", get(ready_check::<S>))
        .with_state(service)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/calls/{call_type}", post(start_call))
        .route("/v1/calls/current", get(current_call).delete(cancel_call))
        .route("/v1/calls/target", put(attach_target).delete(detach_target))
        .route("/v1/metrics", get(metrics))
        .with_state(state)
}

// =============================================================================
// Health Handlers
// =============================================================================

pub async fn health_check<S: StreamcallService>(State(service): State<Arc<S>>) -> Json<HealthStatus> {
    Json(service.health().await)
}

pub async fn ready_check<S: StreamcallService>(State(service): State<Arc<S>>) -> impl IntoResponse {
    let readiness = service.ready().await;
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

// =============================================================================
// Call Handlers
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    #[serde(default)]
    pub opponent_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallAccepted {
    pub call_type: CallType,
    pub opponent_id: String,
}

pub async fn start_call(
    State(state): State<Arc<AppState>>,
    Path(call_type): Path<CallType>,
    Json(req): Json<StartCallRequest>,
) -> impl IntoResponse {
    let opponent = req
        .opponent_id
        .map(OpponentId::new)
        .unwrap_or_else(|| state.default_opponent.clone());

    info!(opponent_id = %opponent, call_type = %call_type, "Starting call");
    state.launch(opponent.clone(), call_type);

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(StartCallAccepted {
            call_type,
            opponent_id: opponent.0,
        })),
    )
}

pub async fn current_call(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CallView>> {
    Json(ApiResponse::success(state.controller.view()))
}

pub async fn cancel_call(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.stop().await;
    (StatusCode::OK, Json(ApiResponse::success(state.controller.view())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachTargetRequest {
    pub container_id: String,
}

pub async fn attach_target(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AttachTargetRequest>,
) -> axum::response::Response {
    if req.container_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("containerId is required")),
        )
            .into_response();
    }

    state.controller.attach_target(RenderTarget::new(req.container_id.clone()));
    (StatusCode::OK, Json(ApiResponse::success(req.container_id))).into_response()
}

pub async fn detach_target(State(state): State<Arc<AppState>>) -> StatusCode {
    state.controller.detach_target();
    StatusCode::NO_CONTENT
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<ApiResponse<MetricsSnapshot>> {
    Json(ApiResponse::success(state.controller.metrics().snapshot()))
}
