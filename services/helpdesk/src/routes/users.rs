//! User listing endpoint

use axum::{Json, extract::State, response::IntoResponse};
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// List every user as its public projection
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.list_public().await.map_err(|e| {
        error!("Failed to list users: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(users))
}
