//! In-memory session store and the session-gate middleware for admin
//! endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApiError;
use crate::main_lib::AppState;

pub const SESSION_COOKIE: &str = "adboard_session";

#[derive(Debug, Clone)]
pub struct Session {
    pub created_at: DateTime<Utc>,
}

/// Process-local session registry. Sessions do not survive a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.write().await.insert(
            token.clone(),
            Session {
                created_at: Utc::now(),
            },
        );
        token
    }

    pub async fn validate(&self, token: &str) -> bool {
        self.inner.read().await.contains_key(token)
    }

    pub async fn remove(&self, token: &str) {
        self.inner.write().await.remove(token);
    }
}

/// Extract the session token from the Cookie header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        let name = parts.next()?;
        if name == SESSION_COOKIE {
            let value = parts.next().unwrap_or("");
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Gate for admin endpoints: rejects requests without a valid session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let authenticated = match session_token(request.headers()) {
        Some(token) => state.sessions.validate(&token).await,
        None => false,
    };
    if !authenticated {
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}
