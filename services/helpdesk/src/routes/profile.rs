//! Profile endpoints
//!
//! A profile is only ever read or written by its owning user. Updates that
//! fail for any reason other than validation are reported with a generic
//! message; partial updates touch several columns and none of the store
//! errors may leak to the caller.

use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::error;

use crate::{
    error::{ApiError, ApiResult, FieldErrors},
    middleware::AuthUser,
    models::{ProfilePatch, ProfileResponse},
    routes::record_action,
    state::AppState,
    validation,
};

const PROFILE_FIELD_MAX: usize = 100;

/// Cap the length of every supplied free-text field
fn validate_profile_patch(payload: &ProfilePatch) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let fields = [
        ("contact", payload.contact.as_deref()),
        ("department", payload.department.as_deref()),
        ("realName", payload.real_name.as_deref()),
        ("accessLevel", payload.access_level.as_deref()),
        ("projectAccessLevel", payload.project_access_level.as_deref()),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            if let Err(msg) = validation::validate_max_length(value, PROFILE_FIELD_MAX) {
                errors.insert(field.to_string(), vec![msg]);
            }
        }
    }
    errors
}

/// Retrieve the requesting principal's own profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .profile_repository
        .find_by_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch profile: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Profile"))?;

    Ok(Json(ProfileResponse::from(profile)))
}

/// Partially update the requesting principal's own profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProfilePatch>,
) -> ApiResult<impl IntoResponse> {
    let errors = validate_profile_patch(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    match state.profile_repository.update(user.id, &payload).await {
        Ok(Some(profile)) => {
            record_action(&state, user.id, "profile.update", String::new()).await;
            Ok(Json(ProfileResponse::from(profile)))
        }
        Ok(None) => Err(ApiError::NotFound("Profile")),
        Err(e) => {
            error!("Profile update failed: {}", e);
            Err(ApiError::InternalServerError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_within_limits_passes() {
        let patch = ProfilePatch {
            department: Some("Sales".to_string()),
            ..ProfilePatch::default()
        };
        assert!(validate_profile_patch(&patch).is_empty());
    }

    #[test]
    fn test_overlong_fields_are_keyed_by_field() {
        let patch = ProfilePatch {
            real_name: Some("x".repeat(101)),
            contact: Some("y".repeat(200)),
            ..ProfilePatch::default()
        };

        let errors = validate_profile_patch(&patch);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("realName"));
        assert!(errors.contains_key("contact"));
    }
}
