//! Registration and token endpoints (public)

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, warn};
use wicket_auth::{hash_password, validate_password_strength, verify_password, PasswordError, TokenKind};
use wicket_core::{LeagueError, NewUser};
use wicket_db::UserRole;

use super::FieldCheck;
use crate::error::ApiError;
use crate::models::*;
use crate::AppState;

const MAX_USERNAME: usize = 150;

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered (inside the response envelope)", body = RegisteredUser),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Server error")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RegisteredUser>>), ApiError> {
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let username = check
        .required("username", req.username)
        .and_then(|u| check.text("username", Some(u), MAX_USERNAME));
    let password = check.required("password", req.password);
    let password2 = check.required("password2", req.password2);
    let email = check.required("email", req.email);
    let role = check
        .required("category", req.category)
        .and_then(|c| check.choice::<UserRole>("category", Some(c)));

    if let Some(username) = &username {
        if !valid_username(username) {
            check.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
    }

    if let Some(email) = &email {
        if !valid_email(email) {
            check.add("email", "Enter a valid email address.");
        }
    }

    if let (Some(password), Some(password2)) = (&password, &password2) {
        if password != password2 {
            check.add("password", "Password fields didn't match.");
        } else if let Err(PasswordError::Weak(problems)) =
            validate_password_strength(password, username.as_deref().unwrap_or_default())
        {
            for problem in problems {
                check.add("password", problem);
            }
        }
    }

    check.finish()?;

    // All required fields are present once the check passes
    let (Some(username), Some(password), Some(email), Some(role)) = (username, password, email, role)
    else {
        return Err(ApiError::Internal("validated fields missing".to_string()));
    };

    let password_hash =
        hash_password(&password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .league
        .register_user(NewUser {
            username,
            email,
            first_name: req.first_name.unwrap_or_default(),
            last_name: req.last_name.unwrap_or_default(),
            password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            LeagueError::UsernameTaken { .. } => {
                ApiError::field("username", "A user with that username already exists.")
            }
            other => other.into(),
        })?;

    info!("User registered: {}", user.label());

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, RegisteredUser::from(&user), "User registered")),
    ))
}

/// Exchange username and password for an access/refresh token pair
#[utoipa::path(
    post,
    path = "/api/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn obtain_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let username = check.required("username", req.username);
    let password = check.required("password", req.password);
    check.finish()?;

    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::Internal("validated fields missing".to_string()));
    };

    let invalid = || {
        ApiError::unauthorized(
            "No active account found with the given credentials",
            "no_active_account",
        )
    };

    let user = state
        .league
        .find_user_by_username(&username)
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(&password, &user.password_hash).unwrap_or_else(|e| {
        warn!("Stored password hash for {} is unusable: {}", user.username, e);
        false
    });
    if !matches {
        debug!("Rejected login for {}", username);
        return Err(invalid());
    }

    let pair = state
        .tokens
        .issue_pair(user.id, &user.username, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("Issued token pair for {}", user.label());

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/token/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Access token issued", body = AccessTokenResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Refresh token invalid or expired", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let refresh = check.required("refresh", req.refresh);
    check.finish()?;

    let Some(refresh) = refresh else {
        return Err(ApiError::Internal("validated fields missing".to_string()));
    };

    let invalid = || ApiError::unauthorized("Token is invalid or expired", "token_not_valid");

    let claims = state
        .validator
        .validate_kind(&refresh, TokenKind::Refresh)
        .map_err(|e| {
            debug!("Rejected refresh token: {}", e);
            invalid()
        })?;
    let user_id = claims.user_id().map_err(|_| invalid())?;

    // Re-read the user so the new token carries the current role
    let user = match state.league.get_user(user_id).await {
        Ok(user) => user,
        Err(LeagueError::NotFound { .. }) => return Err(invalid()),
        Err(e) => return Err(e.into()),
    };

    let access = state
        .tokens
        .issue(TokenKind::Access, user.id, &user.username, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(AccessTokenResponse { access }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("player@club.co.uk"));
        assert!(!valid_email("player"));
        assert!(!valid_email("@club.com"));
        assert!(!valid_email("player@club"));
        assert!(!valid_email("pla yer@club.com"));
    }

    #[test]
    fn test_valid_username() {
        assert!(valid_username("virat.kohli_18"));
        assert!(valid_username("a+b@c-d"));
        assert!(!valid_username("bad name"));
        assert!(!valid_username("semi;colon"));
    }
}
