//! Registration and token endpoints

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult, FieldErrors},
    jwt::TokenType,
    models::{NewUser, PublicUser},
    repositories::CreateUserError,
    routes::record_action,
    state::AppState,
    validation,
};

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request for token refresh and logout
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request for the password-reset stub
#[derive(Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();

    if let Err(msg) = validation::validate_username(&payload.username) {
        errors.insert("username".to_string(), vec![msg]);
    }

    // Email is optional; only validate the format when one was supplied
    if let Some(email) = payload.email.as_deref() {
        if !email.is_empty() {
            if let Err(msg) = validation::validate_email(email) {
                errors.insert("email".to_string(), vec![msg]);
            }
        }
    }

    if let Err(msg) = validation::validate_password(&payload.password) {
        errors.insert("password".to_string(), vec![msg]);
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = state
        .user_repository
        .create(&payload, &state.admin_seed)
        .await
        .map_err(|e| match e {
            CreateUserError::UsernameTaken => ApiError::Conflict {
                field: "username",
                message: "A user with that username already exists.".to_string(),
            },
            other => {
                error!("Failed to create user: {}", other);
                ApiError::InternalServerError
            }
        })?;

    record_action(
        &state,
        user.id,
        "user.register",
        format!("registered as {}", user.username),
    )
    .await;

    let response = PublicUser {
        id: user.id,
        username: user.username,
        email: user.email,
        department: String::new(),
        access_level: String::new(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint: verifies credentials and issues a token pair
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    if !state.rate_limiter.is_allowed(&payload.username).await {
        return Err(ApiError::TooManyRequests);
    }

    // Unknown user and wrong password are indistinguishable to the caller
    let user = state
        .user_repository
        .find_by_username(&payload.username)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;

    if !valid {
        return Err(ApiError::Unauthorized);
    }

    let roles = state
        .role_repository
        .roles_for_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to load roles: {}", e);
            ApiError::InternalServerError
        })?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user, &roles)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(|e| {
            error!("Failed to generate refresh token: {}", e);
            ApiError::InternalServerError
        })?;

    let session_key = format!("session:{}", user.id);
    state
        .redis_pool
        .set(
            &session_key,
            &refresh_token,
            Some(state.jwt_service.refresh_token_expiry()),
        )
        .await
        .map_err(|e| {
            error!("Failed to store session in Redis: {}", e);
            ApiError::InternalServerError
        })?;

    record_action(&state, user.id, "user.login", String::new()).await;

    let response = TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint: rotates the refresh token and issues a new
/// access token with the user's current roles
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized);
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            ApiError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(ApiError::Unauthorized);
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    let roles = state
        .role_repository
        .roles_for_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to load roles: {}", e);
            ApiError::InternalServerError
        })?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user, &roles)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::InternalServerError
        })?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(&state.redis_pool, &user, &payload.refresh_token)
        .await
        .map_err(|e| {
            error!("Failed to rotate refresh token: {}", e);
            ApiError::InternalServerError
        })?;

    let session_key = format!("session:{}", user.id);
    state
        .redis_pool
        .set(
            &session_key,
            &new_refresh_token,
            Some(state.jwt_service.refresh_token_expiry()),
        )
        .await
        .map_err(|e| {
            error!("Failed to update session in Redis: {}", e);
            ApiError::InternalServerError
        })?;

    let response = TokenResponse {
        access_token,
        refresh_token: new_refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint: blacklists the refresh token and drops the session
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::Unauthorized);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| {
            error!("Failed to get current time: {}", e);
            ApiError::InternalServerError
        })?
        .as_secs();

    let expiry = claims.exp.saturating_sub(now);
    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &payload.refresh_token, expiry)
        .await
        .map_err(|e| {
            error!("Failed to blacklist token: {}", e);
            ApiError::InternalServerError
        })?;

    let session_key = format!("session:{}", claims.sub);
    state.redis_pool.delete(&session_key).await.map_err(|e| {
        error!("Failed to remove session from Redis: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Password-reset stub. Always answers with the same generic message; no
/// reset email is actually sent.
pub async fn password_reset(Json(payload): Json<PasswordResetRequest>) -> impl IntoResponse {
    let email = payload.email.unwrap_or_default();
    Json(serde_json::json!({
        "message": format!("If {} exists, a reset link will be sent.", email)
    }))
}
