//! API error type and its HTTP rendering

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use wicket_core::LeagueError;
use wicket_db::UserRole;

use crate::models::{ApiResponse, EmptyData, ErrorResponse};

/// Field name → messages, the `data` of a "Validation failed" envelope
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 with `{detail, code}`
    #[error("{detail}")]
    Unauthorized { detail: String, code: &'static str },

    /// 403 from the role gate
    #[error("Permission denied. Your role '{role}' is not in [{}].", format_roles(.allowed))]
    Forbidden {
        role: UserRole,
        allowed: &'static [UserRole],
    },

    /// 403 when a caller touches a profile that is not theirs
    #[error("Unauthorized")]
    NotOwner,

    /// 404 envelope, e.g. "Team not found"
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid page.")]
    InvalidPage,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Server error: {0}")]
    Internal(String),
}

fn format_roles(roles: &[UserRole]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    pub fn unauthorized(detail: impl Into<String>, code: &'static str) -> Self {
        ApiError::Unauthorized {
            detail: detail.into(),
            code,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } | ApiError::NotOwner => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::InvalidPage => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Unauthorized { detail, code } => (
                status,
                Json(ErrorResponse {
                    detail,
                    code: Some(code.to_string()),
                }),
            )
                .into_response(),
            ApiError::Forbidden { .. } | ApiError::InvalidPage => (
                status,
                Json(ErrorResponse {
                    detail: self.to_string(),
                    code: None,
                }),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                status,
                Json(ApiResponse::new(status.as_u16(), errors, "Validation failed")),
            )
                .into_response(),
            ApiError::Internal(message) => {
                error!("Request failed: {}", message);
                (
                    status,
                    Json(ApiResponse::new(status.as_u16(), EmptyData {}, "Server error")),
                )
                    .into_response()
            }
            ApiError::NotOwner | ApiError::NotFound(_) => {
                let message = self.to_string();
                (
                    status,
                    Json(ApiResponse::new(status.as_u16(), EmptyData {}, message)),
                )
                    .into_response()
            }
        }
    }
}

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        match err {
            LeagueError::NotFound { entity, .. } => ApiError::NotFound(format!("{} not found", entity)),
            LeagueError::TransactionFailure(e) => ApiError::Internal(e.to_string()),
            other => {
                let field = other.field().unwrap_or(NON_FIELD_ERRORS);
                ApiError::field(field, other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::field(NON_FIELD_ERRORS, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::field(NON_FIELD_ERRORS, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wicket_core::EntityKind;

    #[test]
    fn test_forbidden_detail_lists_roles() {
        let err = ApiError::Forbidden {
            role: UserRole::Player,
            allowed: &[UserRole::Admin, UserRole::Organiser],
        };
        assert_eq!(
            err.to_string(),
            "Permission denied. Your role 'PLAYER' is not in [ADMIN, ORGANISER]."
        );
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_league_errors_map_to_fields() {
        let err = ApiError::from(LeagueError::RosterFull {
            team_id: 1,
            limit: 11,
        });
        match err {
            ApiError::Validation(errors) => assert!(errors.contains_key("is_playing")),
            other => panic!("unexpected {:?}", other),
        }

        let err = ApiError::from(LeagueError::NotFound {
            entity: EntityKind::Team,
            id: 3,
        });
        assert_eq!(err.to_string(), "Team not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
