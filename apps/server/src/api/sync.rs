//! Sync trigger, status and settings endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

use adboard_core::sync::{SyncSettings, SyncSettingsUpdate, SyncStatus};
use adboard_core::Error;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Manual sync trigger. Synchronous from the caller's perspective: the
/// response is sent once the run finished or failed. A run already in
/// progress yields 409 with the current status snapshot.
pub async fn run_sync(State(state): State<Arc<AppState>>) -> Response {
    info!("Manual sync trigger received");
    match state.orchestrator.run_sync().await {
        Ok(result) if result.success => (StatusCode::OK, Json(result)).into_response(),
        Ok(result) => {
            error!(
                "Manual sync failed: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(result)).into_response()
        }
        Err(Error::SyncInProgress) => {
            let status = state.orchestrator.sync_status();
            ApiError::Conflict(json!({
                "error": "A sync run is already in progress",
                "errorKind": "already_in_progress",
                "status": status,
            }))
            .into_response()
        }
        Err(err) => {
            error!("Manual sync errored before running: {}", err);
            ApiError::Internal(err.to_string()).into_response()
        }
    }
}

pub async fn get_sync_status(State(state): State<Arc<AppState>>) -> Json<SyncStatus> {
    Json(state.orchestrator.sync_status())
}

pub async fn get_sync_settings(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SyncSettings>> {
    let settings = state.settings_repository.get_settings().await?;
    Ok(Json(settings))
}

pub async fn update_sync_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SyncSettingsUpdate>,
) -> ApiResult<Json<SyncSettings>> {
    let saved = state.settings_repository.update_settings(update).await?;
    info!(
        "Sync settings updated: yandex {}@{}, moysklad {}@{}",
        saved.yandex_enabled, saved.yandex_hour, saved.moysklad_enabled, saved.moysklad_hour
    );
    Ok(Json(saved))
}
