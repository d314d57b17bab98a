//! Audit log endpoint

use axum::{Json, extract::State, response::IntoResponse};
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// List every audit entry, newest first. Available to any authenticated
/// principal; no ownership filter is applied here.
pub async fn list_log_history(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let entries = state.log_repository.list().await.map_err(|e| {
        error!("Failed to list audit entries: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(entries))
}
