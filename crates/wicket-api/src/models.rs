//! Request and response bodies

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use wicket_db::{cricket_match, player_profile, team, user};

/// Envelope wrapped around every non-list success and validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// HTTP status as a string ("200", "201", "400", ...)
    pub code: String,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            data,
            message: message.into(),
        }
    }
}

/// `{}` in the `data` slot of an envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Error body for authentication, permission and paging failures
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub detail: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of rows across all pages
    pub count: u64,
    /// Link to the next page, if any
    pub next: Option<String>,
    /// Link to the previous page, if any
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// `?page=N&page_size=M`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

// Authentication

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Must repeat `password`
    pub password2: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// ADMIN, ORGANISER, CAPTAIN or PLAYER
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub category: String,
}

impl From<&user::Model> for RegisteredUser {
    fn from(user: &user::Model) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            category: user.role.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

// Players

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub category: String,
}

impl From<&user::Model> for UserView {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            category: user.role.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayerView {
    pub id: i32,
    pub user: Option<UserView>,
    pub age: i32,
    /// BATTER, BOWLER, ALL_ROUNDER or WICKET_KEEPER
    #[serde(rename = "type")]
    pub player_type: String,
    /// Team id
    pub team: i32,
    pub matches_played: i32,
    pub total_runs: i32,
    pub wickets: i32,
    pub is_playing: bool,
}

impl PlayerView {
    pub fn new(player: &player_profile::Model, user: Option<&user::Model>) -> Self {
        Self {
            id: player.id,
            user: user.map(UserView::from),
            age: player.age,
            player_type: player.player_type.to_string(),
            team: player.team_id,
            matches_played: player.matches_played,
            total_runs: player.total_runs,
            wickets: player.wickets,
            is_playing: player.is_playing,
        }
    }
}

/// Create or partially update a player profile
///
/// `matches_played` is not accepted; it only moves when matches are recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlayerRequest {
    /// User with role PLAYER owning the profile
    pub user_id: Option<i32>,
    pub age: Option<i32>,
    #[serde(rename = "type")]
    pub player_type: Option<String>,
    /// Team id
    pub team: Option<i32>,
    pub total_runs: Option<i32>,
    pub wickets: Option<i32>,
    pub is_playing: Option<bool>,
}

// Teams

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamView {
    pub id: i32,
    pub name: String,
    pub country: String,
    /// Captain user id
    pub captain: Option<i32>,
    pub matches_played: i32,
    pub wins: i32,
    pub lost: i32,
    pub draw: i32,
    /// 2 per win, 1 per draw
    pub points: i32,
    pub created_at: DateTime<Utc>,
    /// Player profile ids on the roster
    pub players: Vec<i32>,
}

impl TeamView {
    pub fn new(team: &team::Model, players: Vec<i32>) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            country: team.country.clone(),
            captain: team.captain_id,
            matches_played: team.matches_played,
            wins: team.wins,
            lost: team.lost,
            draw: team.draw,
            points: team.points,
            created_at: team.created_at,
            players,
        }
    }
}

/// Create or partially update a team; counters and points are read-only
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TeamRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    /// Captain user id; `null` clears the captain
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub captain: Option<Option<i32>>,
}

// Matches

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchView {
    pub id: i32,
    pub date: NaiveDate,
    pub venue: String,
    pub team1: i32,
    pub team2: i32,
    /// Winning team id; `null` for a draw
    pub winner: Option<i32>,
}

impl From<&cricket_match::Model> for MatchView {
    fn from(record: &cricket_match::Model) -> Self {
        Self {
            id: record.id,
            date: record.date,
            venue: record.venue.clone(),
            team1: record.team1_id,
            team2: record.team2_id,
            winner: record.winner_id,
        }
    }
}

/// Create or partially update a match
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MatchRequest {
    /// YYYY-MM-DD
    pub date: Option<String>,
    pub venue: Option<String>,
    pub team1: Option<i32>,
    pub team2: Option<i32>,
    /// Winning team id; `null` or absent on create records a draw
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub winner: Option<Option<i32>>,
}

/// Tell an explicit `null` apart from a missing field
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_null_and_absent_differ() {
        let absent: MatchRequest = serde_json::from_str(r#"{"venue": "Oval"}"#).unwrap();
        let null: MatchRequest = serde_json::from_str(r#"{"winner": null}"#).unwrap();
        let set: MatchRequest = serde_json::from_str(r#"{"winner": 3}"#).unwrap();

        assert_eq!(absent.winner, None);
        assert_eq!(null.winner, Some(None));
        assert_eq!(set.winner, Some(Some(3)));
    }

    #[test]
    fn test_player_type_uses_type_key() {
        let request: PlayerRequest =
            serde_json::from_str(r#"{"type": "BOWLER", "team": 1}"#).unwrap();
        assert_eq!(request.player_type.as_deref(), Some("BOWLER"));
        assert_eq!(request.team, Some(1));
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::new(201, EmptyData {}, "Team created")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"code": "201", "data": {}, "message": "Team created"})
        );
    }
}
