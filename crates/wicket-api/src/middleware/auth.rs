//! JWT Authentication Middleware
//!
//! Extracts the bearer access token, validates it, loads the user it names
//! and makes that user available to handlers via Axum's Extension. The role
//! is read from the database on every request, so a captain who was reverted
//! to PLAYER loses captain access immediately.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wicket_auth::TokenKind;
use wicket_core::LeagueError;
use wicket_db::UserRole;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated user context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    /// Reject the request unless the caller's role is one of `allowed`
    pub fn require_role(&self, allowed: &'static [UserRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            debug!("Role gate rejected {} ({})", self.username, self.role);
            Err(ApiError::Forbidden {
                role: self.role,
                allowed,
            })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(
                "Authentication credentials were not provided.",
                "not_authenticated",
            )
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'",
            "bad_authorization_header",
        )
    })
}

/// Authentication middleware for protected routes
///
/// Returns 401 if the header is missing or malformed, the token is invalid,
/// expired or a refresh token, or the user no longer exists.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)?;

    let claims = state
        .validator
        .validate_kind(token, TokenKind::Access)
        .map_err(|e| {
            ApiError::unauthorized(
                format!("Given token not valid for any token type: {}", e),
                "token_not_valid",
            )
        })?;

    let user_id = claims
        .user_id()
        .map_err(|e| ApiError::unauthorized(e.to_string(), "token_not_valid"))?;

    let user = match state.league.get_user(user_id).await {
        Ok(user) => user,
        Err(LeagueError::NotFound { .. }) => {
            return Err(ApiError::unauthorized("User not found", "user_not_found"));
        }
        Err(e) => return Err(e.into()),
    };

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_role_gate() {
        const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Organiser];

        assert!(user(UserRole::Admin).require_role(STAFF).is_ok());
        assert!(user(UserRole::Organiser).require_role(STAFF).is_ok());

        let err = user(UserRole::Captain).require_role(STAFF).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Forbidden {
                role: UserRole::Captain,
                ..
            }
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let request = axum::http::Request::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request).unwrap(), "abc.def.ghi");

        let request = axum::http::Request::builder()
            .header("Authorization", "Token abc")
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(matches!(
            bearer_token(&request),
            Err(ApiError::Unauthorized {
                code: "bad_authorization_header",
                ..
            })
        ));

        let request = axum::http::Request::builder().body(axum::body::Body::empty()).unwrap();
        assert!(matches!(
            bearer_token(&request),
            Err(ApiError::Unauthorized {
                code: "not_authenticated",
                ..
            })
        ));
    }
}
