//! Helpdesk service routes

pub mod auth;
pub mod log_history;
pub mod profile;
pub mod tickets;
pub mod users;

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::warn;
use uuid::Uuid;

use crate::{middleware::auth_middleware, state::AppState};

/// Create the router for the helpdesk service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/tickets/:id",
            get(tickets::get_ticket).patch(tickets::update_ticket),
        )
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route("/loghistory", get(log_history::list_log_history))
        .route("/users", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/token", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/password-reset", post(auth::password_reset))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "helpdesk"
    }))
}

/// Append an audit entry for a user action. Best effort: a failed write is
/// logged and must not fail the operation that triggered it.
pub(crate) async fn record_action(state: &AppState, user_id: Uuid, action: &str, details: String) {
    if let Err(e) = state.log_repository.record(user_id, action, &details).await {
        warn!("Failed to record audit entry for action {}: {}", action, e);
    }
}
