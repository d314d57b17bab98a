//! Middleware for JWT token validation and authentication

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, jwt::TokenType, state::AppState};

/// Authenticated principal extracted from the access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Whether the principal carries the given role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Extract and validate the bearer token from the Authorization header,
/// then make the principal available to handlers via request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| ApiError::Unauthorized)?;

    // Refresh tokens cannot be used to reach protected endpoints
    if claims.token_type != TokenType::Access {
        return Err(ApiError::Unauthorized);
    }

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, token)
        .await
        .map_err(|e| {
            error!("Failed to check if token is blacklisted: {}", e);
            ApiError::InternalServerError
        })?;

    if is_blacklisted {
        return Err(ApiError::Unauthorized);
    }

    let user = AuthUser {
        id: claims.sub,
        username: claims.username,
        roles: claims.roles,
        permissions: claims.permissions,
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            username: "teamop".to_string(),
            roles: vec!["ticket-admin".to_string()],
            permissions: vec!["ticket.admin".to_string()],
        };

        assert!(user.has_role("ticket-admin"));
        assert!(!user.has_role("billing-admin"));
        assert_eq!(user.permissions, vec!["ticket.admin".to_string()]);
    }
}
