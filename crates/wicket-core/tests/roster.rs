//! Roster rules against a real SQLite in-memory database

use chrono::NaiveDate;
use wicket_core::{
    League, LeagueError, MatchInput, NewUser, PlayerInput, PlayerPatch, TeamInput, TeamPatch,
    PLAYING_XI,
};
use wicket_db::{connect, migrate, PlayerType, UserRole};

async fn setup_league() -> League {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    migrate(&db).await.expect("Failed to run migrations");
    League::new(db)
}

async fn user(league: &League, username: &str, role: UserRole) -> i32 {
    league
        .register_user(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$placeholder".to_string(),
            role,
        })
        .await
        .expect("Failed to register user")
        .id
}

async fn team(league: &League, name: &str, captain_id: Option<i32>) -> Result<i32, LeagueError> {
    league
        .create_team(TeamInput {
            name: name.to_string(),
            country: "England".to_string(),
            captain_id,
        })
        .await
        .map(|t| t.id)
}

fn profile(user_id: i32, team_id: i32, is_playing: bool) -> PlayerInput {
    PlayerInput {
        user_id,
        age: 21,
        player_type: PlayerType::AllRounder,
        team_id,
        is_playing,
        total_runs: 0,
        wickets: 0,
    }
}

async fn fill_playing_xi(league: &League, team_id: i32) -> Vec<i32> {
    let mut ids = Vec::new();
    for i in 0..PLAYING_XI {
        let user_id = user(league, &format!("xi{}_{}", team_id, i), UserRole::Player).await;
        let player = league
            .create_player_profile(profile(user_id, team_id, true))
            .await
            .expect("Failed to create active player");
        ids.push(player.id);
    }
    ids
}

#[tokio::test]
async fn test_twelfth_active_player_is_rejected() {
    let league = setup_league().await;
    let a = team(&league, "A", None).await.unwrap();
    fill_playing_xi(&league, a).await;

    let twelfth = user(&league, "twelfth", UserRole::Player).await;
    let err = league
        .create_player_profile(profile(twelfth, a, true))
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::RosterFull { limit: 11, .. }));
    assert_eq!(err.field(), Some("is_playing"));

    let bench = league
        .create_player_profile(profile(twelfth, a, false))
        .await
        .expect("Bench players are not capped");

    let err = league
        .update_player_profile(
            bench.id,
            PlayerPatch {
                is_playing: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::RosterFull { .. }));
}

#[tokio::test]
async fn test_updating_an_active_player_in_full_xi_succeeds() {
    let league = setup_league().await;
    let a = team(&league, "A", None).await.unwrap();
    let ids = fill_playing_xi(&league, a).await;

    let updated = league
        .update_player_profile(
            ids[10],
            PlayerPatch {
                age: Some(30),
                total_runs: Some(88),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update 11th player");

    assert_eq!(updated.age, 30);
    assert_eq!(updated.total_runs, 88);
    assert!(updated.is_playing);
}

#[tokio::test]
async fn test_moving_active_player_into_full_team_is_rejected() {
    let league = setup_league().await;
    let a = team(&league, "A", None).await.unwrap();
    let b = team(&league, "B", None).await.unwrap();
    fill_playing_xi(&league, a).await;

    let mover = user(&league, "mover", UserRole::Player).await;
    let player = league
        .create_player_profile(profile(mover, b, true))
        .await
        .unwrap();

    let err = league
        .update_player_profile(
            player.id,
            PlayerPatch {
                team_id: Some(a),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::RosterFull { team_id, .. } if team_id == a));

    let (stored, _) = league.get_player_profile(player.id).await.unwrap();
    assert_eq!(stored.team_id, b);
}

#[tokio::test]
async fn test_profile_requires_player_role_and_is_unique() {
    let league = setup_league().await;
    let a = team(&league, "A", None).await.unwrap();
    let organiser = user(&league, "organiser", UserRole::Organiser).await;
    let p = user(&league, "p", UserRole::Player).await;

    let err = league
        .create_player_profile(profile(organiser, a, false))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LeagueError::RoleViolation {
            expected: UserRole::Player,
            actual: UserRole::Organiser,
            ..
        }
    ));

    league.create_player_profile(profile(p, a, false)).await.unwrap();
    let err = league
        .create_player_profile(profile(p, a, false))
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::DuplicateProfile { user_id } if user_id == p));

    let err = league
        .create_player_profile(profile(p, 999, false))
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::DuplicateProfile { .. }));

    let q = user(&league, "q", UserRole::Player).await;
    let err = league
        .create_player_profile(profile(q, 999, false))
        .await
        .unwrap_err();
    assert!(matches!(err, LeagueError::InvalidReference { field: "team", .. }));
}

#[tokio::test]
async fn test_captain_cannot_lead_two_teams() {
    let league = setup_league().await;
    let u = user(&league, "u", UserRole::Captain).await;
    let a = team(&league, "A", Some(u)).await.unwrap();

    let err = team(&league, "B", Some(u)).await.unwrap_err();
    assert!(matches!(err, LeagueError::AlreadyCaptain { user_id, team_id } if user_id == u && team_id == a));

    let b = team(&league, "B", None).await.unwrap();
    let err = league.set_team_captain(b, Some(u)).await.unwrap_err();
    assert!(matches!(err, LeagueError::AlreadyCaptain { .. }));

    // Re-assigning to the same team is fine
    let team_a = league.set_team_captain(a, Some(u)).await.unwrap();
    assert_eq!(team_a.captain_id, Some(u));
    assert_eq!(league.get_user(u).await.unwrap().role, UserRole::Captain);
}

#[tokio::test]
async fn test_captain_must_hold_captain_role() {
    let league = setup_league().await;
    let p = user(&league, "p", UserRole::Player).await;

    let err = team(&league, "A", Some(p)).await.unwrap_err();
    assert!(matches!(
        err,
        LeagueError::RoleViolation {
            field: "captain",
            expected: UserRole::Captain,
            ..
        }
    ));

    let err = team(&league, "A", Some(999)).await.unwrap_err();
    assert!(matches!(err, LeagueError::InvalidReference { field: "captain", .. }));
}

#[tokio::test]
async fn test_replaced_captain_reverts_to_player() {
    let league = setup_league().await;
    let first = user(&league, "first", UserRole::Captain).await;
    let second = user(&league, "second", UserRole::Captain).await;
    let a = team(&league, "A", Some(first)).await.unwrap();

    let updated = league
        .update_team(
            a,
            TeamPatch {
                name: Some("A Renamed".to_string()),
                captain_id: Some(Some(second)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "A Renamed");
    assert_eq!(updated.captain_id, Some(second));
    assert_eq!(league.get_user(first).await.unwrap().role, UserRole::Player);
    assert_eq!(league.get_user(second).await.unwrap().role, UserRole::Captain);

    league.set_team_captain(a, None).await.unwrap();
    assert_eq!(league.get_user(second).await.unwrap().role, UserRole::Player);
    assert_eq!(league.get_team(a).await.unwrap().captain_id, None);
}

#[tokio::test]
async fn test_team_update_without_captain_keeps_captain() {
    let league = setup_league().await;
    let u = user(&league, "u", UserRole::Captain).await;
    let a = team(&league, "A", Some(u)).await.unwrap();

    let updated = league
        .update_team(
            a,
            TeamPatch {
                country: Some("Wales".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.country, "Wales");
    assert_eq!(updated.captain_id, Some(u));
    assert_eq!(league.get_user(u).await.unwrap().role, UserRole::Captain);
}

#[tokio::test]
async fn test_removing_team_reverts_opponents_and_captain() {
    let league = setup_league().await;
    let u = user(&league, "u", UserRole::Captain).await;
    let a = team(&league, "A", Some(u)).await.unwrap();
    let b = team(&league, "B", None).await.unwrap();
    let c = team(&league, "C", None).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    for (team1_id, team2_id, winner_id) in [(a, b, Some(b)), (c, a, None), (b, c, Some(b))] {
        league
            .create_match(MatchInput {
                date,
                venue: "Trent Bridge".to_string(),
                team1_id,
                team2_id,
                winner_id,
            })
            .await
            .unwrap();
    }

    league.delete_team(a).await.expect("Failed to delete team");

    let team_b = league.get_team(b).await.unwrap();
    let team_c = league.get_team(c).await.unwrap();
    assert_eq!((team_b.matches_played, team_b.wins, team_b.points), (1, 1, 2));
    assert_eq!(
        (team_c.matches_played, team_c.lost, team_c.draw, team_c.points),
        (1, 1, 0, 0)
    );
    assert_eq!(league.get_user(u).await.unwrap().role, UserRole::Player);
    assert!(matches!(
        league.get_team(a).await,
        Err(LeagueError::NotFound { .. })
    ));
    assert_eq!(league.list_matches(1, 10).await.unwrap().total, 1);
}

#[tokio::test]
async fn test_username_must_be_unique() {
    let league = setup_league().await;
    user(&league, "taken", UserRole::Player).await;

    let err = league
        .register_user(NewUser {
            username: "taken".to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "x".to_string(),
            role: UserRole::Admin,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, LeagueError::UsernameTaken { .. }));
    assert_eq!(err.field(), Some("username"));
}
