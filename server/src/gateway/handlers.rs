//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::gateway::state::GatewayState;
use crate::github::{derive_pages_url, derive_repo_url};
use crate::models::notification::NotificationPayload;
use crate::models::request::RawDeployRequest;
use crate::utils::version_info;

use secrecy::ExposeSecret;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Synchronous rejection body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Dedup-hit reply
#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    pub status: String,
    pub note: String,
    pub pages_url: String,
    pub repo_url: String,
    pub cached_result: NotificationPayload,
}

/// Accepted-for-processing reply
#[derive(Debug, Serialize)]
pub struct ProcessingResponse {
    pub status: String,
    pub note: String,
    pub task_id: String,
    pub expected_pages_url: String,
    pub expected_repo_url: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "operational".to_string(),
        version: version_info().version,
    })
}

/// Deployment intake handler.
///
/// Auth and field validation reject synchronously with no side effects.
/// A dedup hit replays the stored payload and answers from the cache; a
/// miss dispatches the orchestrator and acknowledges immediately.
pub async fn deploy_handler(
    State(state): State<Arc<GatewayState>>,
    Json(raw): Json<RawDeployRequest>,
) -> Response {
    // Step 0: authentication
    let supplied = raw.secret.as_deref().unwrap_or_default();
    if supplied != state.shared_secret.expose_secret() {
        warn!("Authentication failed for deployment request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid authentication credentials".to_string(),
            }),
        )
            .into_response();
    }

    // Required-field validation, first missing field names the rejection
    let request = match raw.validate() {
        Ok(request) => request,
        Err(EngineError::ValidationError(message)) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse { error: e.to_string() }),
            )
                .into_response();
        }
    };

    let key = request.identity_key();

    // Dedup: a stored record is canonical, replay it instead of recomputing
    if let Some(cached) = state.store.lookup(&key).await {
        info!("Duplicate request detected for {}. Re-sending notification.", key);

        if let Some(endpoint) = &request.evaluation_url {
            state.notifier.notify(endpoint, &cached).await;
        }

        return (
            StatusCode::OK,
            Json(DuplicateResponse {
                status: "success".to_string(),
                note: "duplicate request handled and re-notified".to_string(),
                pages_url: derive_pages_url(&state.owner, &request.task),
                repo_url: derive_repo_url(&state.owner, &request.task),
                cached_result: cached,
            }),
        )
            .into_response();
    }

    // Fresh request: background dispatch, acknowledge immediately
    let reply = ProcessingResponse {
        status: "processing".to_string(),
        note: format!("deployment initiated for round {}", request.round),
        task_id: request.task.clone(),
        expected_pages_url: derive_pages_url(&state.owner, &request.task),
        expected_repo_url: derive_repo_url(&state.owner, &request.task),
    };

    state
        .dispatcher
        .dispatch(state.orchestrator.clone(), request)
        .await;

    (StatusCode::ACCEPTED, Json(reply)).into_response()
}
