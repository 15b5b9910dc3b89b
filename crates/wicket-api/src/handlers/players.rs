//! Player profile endpoints

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
use wicket_core::{PlayerInput, PlayerPatch};
use wicket_db::{PlayerType, UserRole};

use super::{FieldCheck, PageRequest, ALL_ROLES, STAFF_AND_CAPTAINS};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

fn player_input(req: PlayerRequest) -> Result<PlayerInput, ApiError> {
    let mut check = FieldCheck::default();

    let user_id = check.required("user_id", req.user_id);
    let age = check.required("age", req.age);
    let age = check.non_negative("age", age);
    let team_id = check.required("team", req.team);
    let player_type = check.choice::<PlayerType>("type", req.player_type);
    let total_runs = check.non_negative("total_runs", req.total_runs);
    let wickets = check.non_negative("wickets", req.wickets);

    check.finish()?;

    match (user_id, age, team_id) {
        (Some(user_id), Some(age), Some(team_id)) => Ok(PlayerInput {
            user_id,
            age,
            player_type: player_type.unwrap_or_default(),
            team_id,
            is_playing: req.is_playing.unwrap_or(false),
            total_runs: total_runs.unwrap_or(0),
            wickets: wickets.unwrap_or(0),
        }),
        _ => Err(ApiError::Internal("validated fields missing".to_string())),
    }
}

fn player_patch(req: PlayerRequest) -> Result<PlayerPatch, ApiError> {
    let mut check = FieldCheck::default();

    let patch = PlayerPatch {
        user_id: req.user_id,
        age: check.non_negative("age", req.age),
        player_type: check.choice::<PlayerType>("type", req.player_type),
        team_id: req.team,
        is_playing: req.is_playing,
        total_runs: check.non_negative("total_runs", req.total_runs),
        wickets: check.non_negative("wickets", req.wickets),
    };

    check.finish()?;
    Ok(patch)
}

async fn player_view(state: &AppState, id: i32) -> Result<PlayerView, ApiError> {
    let (player, user) = state.league.get_player_profile(id).await?;
    Ok(PlayerView::new(&player, user.as_ref()))
}

/// List player profiles
#[utoipa::path(
    get,
    path = "/api/players/",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Page size (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "Paginated player profiles", body = [PlayerView]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "players"
)]
pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    uri: Uri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Paginated<PlayerView>>, ApiError> {
    user.require_role(ALL_ROLES)?;
    let page = PageRequest::from_query(query)?;

    debug!("Listing players (page {})", page.page);

    let listing = state
        .league
        .list_player_profiles(page.page, page.page_size)
        .await?;
    let results = listing
        .items
        .iter()
        .map(|(player, owner)| PlayerView::new(player, owner.as_ref()))
        .collect();

    Ok(Json(page.paginate(uri.path(), listing.total, results)?))
}

/// Get a player profile by ID
#[utoipa::path(
    get,
    path = "/api/players/{id}/",
    params(
        ("id" = i32, Path, description = "Player profile ID")
    ),
    responses(
        (status = 200, description = "Player profile (inside the response envelope)", body = PlayerView),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn get_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PlayerView>>, ApiError> {
    user.require_role(ALL_ROLES)?;
    debug!("Getting player: {}", id);

    let view = player_view(&state, id).await?;
    Ok(Json(ApiResponse::new(200, view, "Success")))
}

/// Create a player profile
#[utoipa::path(
    post,
    path = "/api/players/",
    request_body = PlayerRequest,
    responses(
        (status = 201, description = "Player created (inside the response envelope)", body = PlayerView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    tag = "players"
)]
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PlayerView>>), ApiError> {
    user.require_role(STAFF_AND_CAPTAINS)?;
    let Json(req) = payload?;
    let input = player_input(req)?;

    let player = state.league.create_player_profile(input).await?;
    let view = player_view(&state, player.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, view, "Player created")),
    ))
}

/// Partially update a player profile
///
/// A PLAYER may only update their own profile.
#[utoipa::path(
    put,
    path = "/api/players/{id}/",
    params(
        ("id" = i32, Path, description = "Player profile ID")
    ),
    request_body = PlayerRequest,
    responses(
        (status = 200, description = "Player updated (inside the response envelope)", body = PlayerView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not allowed to edit this profile"),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn update_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PlayerView>>, ApiError> {
    user.require_role(ALL_ROLES)?;

    let (existing, _) = state.league.get_player_profile(id).await?;
    if user.role == UserRole::Player && existing.user_id != user.user_id {
        return Err(ApiError::NotOwner);
    }

    let Json(req) = payload?;
    let patch = player_patch(req)?;

    let player = state.league.update_player_profile(id, patch).await?;
    let view = player_view(&state, player.id).await?;

    Ok(Json(ApiResponse::new(200, view, "Player updated")))
}

/// Delete a player profile
///
/// Only admins may delete a profile that is not their own.
#[utoipa::path(
    delete,
    path = "/api/players/{id}/",
    params(
        ("id" = i32, Path, description = "Player profile ID")
    ),
    responses(
        (status = 200, description = "Player deleted"),
        (status = 403, description = "Not allowed to delete this profile"),
        (status = 404, description = "Player not found")
    ),
    tag = "players"
)]
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    user.require_role(STAFF_AND_CAPTAINS)?;

    let (existing, _) = state.league.get_player_profile(id).await?;
    if !user.is_admin() && existing.user_id != user.user_id {
        return Err(ApiError::NotOwner);
    }

    state.league.delete_player_profile(id).await?;

    Ok(Json(ApiResponse::new(200, EmptyData {}, "Player deleted")))
}
