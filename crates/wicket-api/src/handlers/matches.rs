//! Match endpoints
//!
//! Every write goes through the reconciler, so standings and player match
//! counts follow the stored results.

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
use wicket_core::{MatchInput, MatchPatch};

use super::{FieldCheck, PageRequest, STAFF};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

const MAX_VENUE: usize = 200;

/// List matches
#[utoipa::path(
    get,
    path = "/api/matches/",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Page size (default: 10, max: 100)")
    ),
    responses(
        (status = 200, description = "Paginated matches", body = [MatchView]),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Invalid page", body = ErrorResponse)
    ),
    tag = "matches"
)]
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    uri: Uri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Paginated<MatchView>>, ApiError> {
    user.require_role(STAFF)?;
    let page = PageRequest::from_query(query)?;

    debug!("Listing matches (page {})", page.page);

    let listing = state.league.list_matches(page.page, page.page_size).await?;
    let results = listing.items.iter().map(MatchView::from).collect();

    Ok(Json(page.paginate(uri.path(), listing.total, results)?))
}

/// Get a match by ID
#[utoipa::path(
    get,
    path = "/api/matches/{id}/",
    params(
        ("id" = i32, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Match (inside the response envelope)", body = MatchView),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn get_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MatchView>>, ApiError> {
    user.require_role(STAFF)?;

    let record = state.league.get_match(id).await?;
    Ok(Json(ApiResponse::new(200, MatchView::from(&record), "Success")))
}

/// Record a match result
#[utoipa::path(
    post,
    path = "/api/matches/",
    request_body = MatchRequest,
    responses(
        (status = 201, description = "Match created (inside the response envelope)", body = MatchView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role not allowed", body = ErrorResponse)
    ),
    tag = "matches"
)]
pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<MatchView>>), ApiError> {
    user.require_role(STAFF)?;
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let date = check
        .required("date", req.date)
        .and_then(|d| check.date("date", Some(d)));
    let venue = check
        .required("venue", req.venue)
        .and_then(|v| check.text("venue", Some(v), MAX_VENUE));
    let team1_id = check.required("team1", req.team1);
    let team2_id = check.required("team2", req.team2);
    check.finish()?;

    let (Some(date), Some(venue), Some(team1_id), Some(team2_id)) =
        (date, venue, team1_id, team2_id)
    else {
        return Err(ApiError::Internal("validated fields missing".to_string()));
    };

    let record = state
        .league
        .create_match(MatchInput {
            date,
            venue,
            team1_id,
            team2_id,
            winner_id: req.winner.flatten(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(201, MatchView::from(&record), "Match created")),
    ))
}

/// Partially update a match result
///
/// The previous outcome is reverted before the new one is applied.
/// Send `winner: null` to turn the match into a draw.
#[utoipa::path(
    put,
    path = "/api/matches/{id}/",
    params(
        ("id" = i32, Path, description = "Match ID")
    ),
    request_body = MatchRequest,
    responses(
        (status = 200, description = "Match updated (inside the response envelope)", body = MatchView),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn update_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MatchView>>, ApiError> {
    user.require_role(STAFF)?;
    let Json(req) = payload?;

    let mut check = FieldCheck::default();
    let patch = MatchPatch {
        date: check.date("date", req.date),
        venue: check.text("venue", req.venue, MAX_VENUE),
        team1_id: req.team1,
        team2_id: req.team2,
        winner_id: req.winner,
    };
    check.finish()?;

    let record = state.league.update_match(id, patch).await?;

    Ok(Json(ApiResponse::new(
        200,
        MatchView::from(&record),
        "Match updated",
    )))
}

/// Delete a match and revert its result
#[utoipa::path(
    delete,
    path = "/api/matches/{id}/",
    params(
        ("id" = i32, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Match deleted"),
        (status = 403, description = "Role not allowed", body = ErrorResponse),
        (status = 404, description = "Match not found")
    ),
    tag = "matches"
)]
pub async fn delete_match(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError> {
    user.require_role(STAFF)?;

    state.league.delete_match(id).await?;

    Ok(Json(ApiResponse::new(200, EmptyData {}, "Match deleted")))
}
