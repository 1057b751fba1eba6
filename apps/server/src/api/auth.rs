//! Session login/logout endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{session_token, SESSION_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let expected = state
        .admin_password
        .as_deref()
        .ok_or_else(|| ApiError::Internal("ADMIN_PASSWORD is not configured".to_string()))?;

    if body.password != expected {
        return Err(ApiError::Unauthorized);
    }

    let token = state.sessions.create().await;
    info!("Admin session created");
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax",
        SESSION_COOKIE, token
    );
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionStatusResponse {
            authenticated: true,
        }),
    ))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token).await;
    }
    let cookie = format!("{}=; HttpOnly; Path=/; Max-Age=0", SESSION_COOKIE);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionStatusResponse {
            authenticated: false,
        }),
    ))
}

pub async fn session_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse> {
    let authenticated = match session_token(&headers) {
        Some(token) => state.sessions.validate(&token).await,
        None => false,
    };
    Json(SessionStatusResponse { authenticated })
}
