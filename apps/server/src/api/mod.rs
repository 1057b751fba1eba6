//! REST API routes.

pub mod auth;
pub mod payments;
pub mod stats;
pub mod sync;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::auth::require_session;
use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    // Manual sync trigger, settings and payments require a session; status,
    // stats reads and the auth endpoints themselves do not.
    let protected = Router::new()
        .route("/sync/run", post(sync::run_sync))
        .route("/sync/settings", get(sync::get_sync_settings))
        .route("/sync/settings", put(sync::update_sync_settings))
        .route(
            "/orders/{order_id}/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route("/payments/{payment_id}", delete(payments::delete_payment))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_session,
        ));

    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::session_status))
        .route("/sync/status", get(sync::get_sync_status))
        .route("/stats/campaigns", get(stats::get_campaign_stats));

    Router::new()
        .nest("/api", public.merge(protected))
        .with_state(state)
}
