//! Integration tests for wicket-db
//!
//! Exercises the schema against a real SQLite in-memory database

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, Set,
};
use wicket_db::{connect, cricket_match, migrate, player_profile, team, user, PlayerType, UserRole};

async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_user(db: &sea_orm::DatabaseConnection, username: &str, role: UserRole) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set("$argon2id$placeholder".to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

async fn insert_team(db: &sea_orm::DatabaseConnection, name: &str, captain_id: Option<i32>) -> team::Model {
    team::ActiveModel {
        name: Set(name.to_string()),
        country: Set("India".to_string()),
        captain_id: Set(captain_id),
        matches_played: Set(0),
        wins: Set(0),
        lost: Set(0),
        draw: Set(0),
        points: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert team")
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_role_round_trips_through_database() {
    let db = setup_test_db().await;

    let organiser = insert_user(&db, "organiser", UserRole::Organiser).await;

    let found = user::Entity::find_by_id(organiser.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("User not found");

    assert_eq!(found.role, UserRole::Organiser);
    assert_eq!(found.label(), "organiser (ORGANISER)");
}

#[tokio::test]
async fn test_username_is_unique() {
    let db = setup_test_db().await;

    insert_user(&db, "dup", UserRole::Player).await;

    let second = user::ActiveModel {
        username: Set("dup".to_string()),
        email: Set(String::new()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        password_hash: Set("x".to_string()),
        role: Set(UserRole::Player),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&db)
    .await;

    assert!(second.is_err());
}

#[tokio::test]
async fn test_player_profile_defaults_and_type_column() {
    let db = setup_test_db().await;

    let player = insert_user(&db, "player", UserRole::Player).await;
    let team = insert_team(&db, "Team A", None).await;

    let profile = player_profile::ActiveModel {
        user_id: Set(player.id),
        age: Set(25),
        player_type: Set(PlayerType::WicketKeeper),
        team_id: Set(team.id),
        matches_played: Set(0),
        total_runs: Set(0),
        wickets: Set(0),
        is_playing: Set(true),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("Failed to insert profile");

    let roster = team
        .find_related(player_profile::Entity)
        .all(&db)
        .await
        .expect("Failed to query roster");

    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].id, profile.id);
    assert_eq!(roster[0].player_type, PlayerType::WicketKeeper);
}

#[tokio::test]
async fn test_deleting_team_cascades_players_and_matches() {
    let db = setup_test_db().await;

    let player = insert_user(&db, "player", UserRole::Player).await;
    let team_a = insert_team(&db, "Team A", None).await;
    let team_b = insert_team(&db, "Team B", None).await;

    player_profile::ActiveModel {
        user_id: Set(player.id),
        age: Set(22),
        player_type: Set(PlayerType::Bowler),
        team_id: Set(team_a.id),
        matches_played: Set(0),
        total_runs: Set(0),
        wickets: Set(0),
        is_playing: Set(false),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("Failed to insert profile");

    cricket_match::ActiveModel {
        date: Set(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
        venue: Set("Eden Gardens".to_string()),
        team1_id: Set(team_a.id),
        team2_id: Set(team_b.id),
        winner_id: Set(Some(team_a.id)),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("Failed to insert match");

    team_a.delete(&db).await.expect("Failed to delete team");

    let players = player_profile::Entity::find()
        .count(&db)
        .await
        .expect("Failed to count players");
    let matches = cricket_match::Entity::find()
        .count(&db)
        .await
        .expect("Failed to count matches");

    assert_eq!(players, 0);
    assert_eq!(matches, 0);
}

#[tokio::test]
async fn test_deleting_captain_clears_team_captain() {
    let db = setup_test_db().await;

    let captain = insert_user(&db, "captain", UserRole::Captain).await;
    let team = insert_team(&db, "Team A", Some(captain.id)).await;

    captain.delete(&db).await.expect("Failed to delete captain");

    let team = team::Entity::find()
        .filter(team::Column::Id.eq(team.id))
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Team not found");

    assert_eq!(team.captain_id, None);
}
