//! Team endpoints

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    Extension, Json,
};
use tracing::debug;
use wicket_core::{TeamInput, TeamPatch};

use super::{FieldCheck, PageRequest, STAFF, STAFF_AND_CAPTAINS};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

const MAX_TEAM_TEXT: usize = 100;

async fn team_view(state: &AppState, team: &wicket_db::team::Model) -> Result<TeamView, ApiError> {
    let mut rosters = state.league.roster_ids(&[team.id]).await?;
    let players = rosters.remove(&team.id).unwrap_or_default();
    Ok(TeamView::new(team, players))
}

/// List teams
#[utoipa::path(
    get,
    path = "/api/teams/",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Page size (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "Paginated teams", body = [TeamView]),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    uri: Uri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Paginated<TeamView>>, ApiError> {
    user.require_role(STAFF_AND_CAPTAINS)?;
    let page = PageRequest::from_query(query)?;

    debug!("Listing teams (page {})", page.page);

    let listing = state.league.list_teams(page.page, page.page_size).await?;
    let ids: Vec<i32> = listing.items.iter().map(|t| t.id).collect();
    let mut rosters = state.league.roster_ids(&ids).await?;

    let results = listing
        .items
        .iter()
        .map(|team| TeamView::new(team, rosters.remove(&team.id).unwrap_or_default()))
        .collect();

    Ok(Json(page.paginate(uri.path(), listing.total, results)?))
}

/// Get a team by ID
#[utoipa::path(
    get,
    path = "/api/teams/{id}/",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team (inside the response envelope)", body = TeamView),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TeamView>>, ApiError> {
    user.require_role(STAFF_AND_CAPTAINS)?;

    let team = state.league.get_team(id).await?;
    let view = team_view(&state, &team).await?;

    Ok(Json(ApiResponse::new(200, view, "Success")))
}

/// Create a team
#[utoipa::path(
    post,
    path = "/api/teams/",
    request_body = TeamRequest,
    responses(
        (status = 201, description = "Team created (inside the response envelope)", body = TeamView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<TeamRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<TeamView>>), ApiError> {
    user.require_role(STAFF)?;
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let name = check
        .required("name", req.name)
        .and_then(|n| check.text("name", Some(n), MAX_TEAM_TEXT));
    let country = check
        .required("country", req.country)
        .and_then(|c| check.text("country", Some(c), MAX_TEAM_TEXT));
    check.finish()?;

    let (Some(name), Some(country)) = (name, country) else {
        return Err(ApiError::Internal("validated fields missing".to_string()));
    };

    let team = state
        .league
        .create_team(TeamInput {
            name,
            country,
            captain_id: req.captain.flatten(),
        })
        .await?;
    let view = team_view(&state, &team).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, view, "Team created")),
    ))
}

/// Partially update a team
///
/// Sending `captain: null` clears the captain and demotes the former one.
#[utoipa::path(
    put,
    path = "/api/teams/{id}/",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    request_body = TeamRequest,
    responses(
        (status = 200, description = "Team updated (inside the response envelope)", body = TeamView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<TeamRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TeamView>>, ApiError> {
    user.require_role(STAFF)?;
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let patch = TeamPatch {
        name: check.text("name", req.name, MAX_TEAM_TEXT),
        country: check.text("country", req.country, MAX_TEAM_TEXT),
        captain_id: req.captain,
    };
    check.finish()?;

    let team = state.league.update_team(id, patch).await?;
    let view = team_view(&state, &team).await?;

    Ok(Json(ApiResponse::new(200, view, "Team updated")))
}

/// Delete a team
///
/// Matches the team played are reverted from their opponents' standings first.
#[utoipa::path(
    delete,
    path = "/api/teams/{id}/",
    params(
        ("id" = i32, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team deleted"),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    user.require_role(STAFF)?;

    state.league.delete_team(id).await?;

    Ok(Json(ApiResponse::new(200, EmptyData {}, "Team deleted")))
}
