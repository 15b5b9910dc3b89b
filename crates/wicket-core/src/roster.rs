//! Roster rules: captaincy, the playing XI cap, and team removal

use chrono::Utc;
use tracing::{debug, warn};
use wicket_db::{player_profile, team, user, PlayerType, UserRole};

use crate::error::{EntityKind, LeagueError, LeagueResult};
use crate::reconciler::revert_outcome;
use crate::store::EntityStore;

/// Maximum number of `is_playing` profiles per team
pub const PLAYING_XI: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamInput {
    pub name: String,
    pub country: String,
    pub captain_id: Option<i32>,
}

/// Partial team update; `captain_id: Some(None)` clears the captain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub captain_id: Option<Option<i32>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInput {
    pub user_id: i32,
    pub age: i32,
    pub player_type: PlayerType,
    pub team_id: i32,
    pub is_playing: bool,
    pub total_runs: i32,
    pub wickets: i32,
}

/// Partial profile update. matches_played is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerPatch {
    pub user_id: Option<i32>,
    pub age: Option<i32>,
    pub player_type: Option<PlayerType>,
    pub team_id: Option<i32>,
    pub is_playing: Option<bool>,
    pub total_runs: Option<i32>,
    pub wickets: Option<i32>,
}

pub async fn load_team<S>(store: &S, id: i32) -> LeagueResult<team::Model>
where
    S: EntityStore + ?Sized,
{
    store.get_team(id).await?.ok_or(LeagueError::NotFound {
        entity: EntityKind::Team,
        id,
    })
}

pub async fn load_player<S>(store: &S, id: i32) -> LeagueResult<player_profile::Model>
where
    S: EntityStore + ?Sized,
{
    store.get_player(id).await?.ok_or(LeagueError::NotFound {
        entity: EntityKind::Player,
        id,
    })
}

/// Check that a user may captain `for_team` (`None` for a team not yet stored)
pub async fn vet_captain<S>(
    store: &S,
    user_id: i32,
    for_team: Option<i32>,
) -> LeagueResult<user::Model>
where
    S: EntityStore + ?Sized,
{
    let user = store
        .get_user(user_id)
        .await?
        .ok_or(LeagueError::InvalidReference {
            field: "captain",
            entity: EntityKind::User,
            id: user_id,
        })?;

    if user.role != UserRole::Captain {
        return Err(LeagueError::RoleViolation {
            field: "captain",
            user_id,
            expected: UserRole::Captain,
            actual: user.role,
        });
    }

    if let Some(current) = store.find_captain_of(user_id).await? {
        if Some(current.id) != for_team {
            warn!(
                "Rejected captain assignment: user {} already captains team {}",
                user_id, current.id
            );
            return Err(LeagueError::AlreadyCaptain {
                user_id,
                team_id: current.id,
            });
        }
    }

    Ok(user)
}

/// Revert a captain who lost their team back to PLAYER
pub async fn demote_to_player<S>(store: &S, user_id: i32) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    let Some(mut user) = store.get_user(user_id).await? else {
        return Ok(());
    };

    if user.role == UserRole::Captain {
        user.role = UserRole::Player;
        store.save_user(&user).await?;
        debug!("User {} reverted from CAPTAIN to PLAYER", user_id);
    }

    Ok(())
}

/// Set (or clear) a team's captain and save the team
///
/// A different former captain is reverted to PLAYER.
pub async fn assign_captain<S>(
    store: &S,
    team: &mut team::Model,
    captain_id: Option<i32>,
) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    if let Some(user_id) = captain_id {
        vet_captain(store, user_id, Some(team.id)).await?;
    }

    let former = team.captain_id;
    team.captain_id = captain_id;
    *team = store.save_team(team).await?;

    if let Some(former) = former.filter(|id| Some(*id) != captain_id) {
        demote_to_player(store, former).await?;
    }

    Ok(())
}

pub async fn create_team<S>(store: &S, input: &TeamInput) -> LeagueResult<team::Model>
where
    S: EntityStore + ?Sized,
{
    if let Some(user_id) = input.captain_id {
        vet_captain(store, user_id, None).await?;
    }

    let record = team::Model {
        id: 0,
        name: input.name.clone(),
        country: input.country.clone(),
        captain_id: input.captain_id,
        matches_played: 0,
        wins: 0,
        lost: 0,
        draw: 0,
        points: 0,
        created_at: Utc::now(),
    };

    Ok(store.insert_team(record).await?)
}

pub async fn update_team<S>(store: &S, id: i32, patch: TeamPatch) -> LeagueResult<team::Model>
where
    S: EntityStore + ?Sized,
{
    let mut team = load_team(store, id).await?;

    if let Some(name) = patch.name {
        team.name = name;
    }
    if let Some(country) = patch.country {
        team.country = country;
    }

    match patch.captain_id {
        Some(captain_id) => assign_captain(store, &mut team, captain_id).await?,
        None => team = store.save_team(&team).await?,
    }

    Ok(team)
}

/// Delete a team without leaving stale standings behind
///
/// Every match the team played is reverted first so opponents lose the
/// credit for it, then the captain is reverted to PLAYER, then the team is
/// deleted along with its profiles and matches.
pub async fn remove_team<S>(store: &S, id: i32) -> LeagueResult<team::Model>
where
    S: EntityStore + ?Sized,
{
    let team = load_team(store, id).await?;

    let matches = store.matches_involving(id).await?;
    for record in &matches {
        revert_outcome(store, record).await?;
    }

    if let Some(captain_id) = team.captain_id {
        demote_to_player(store, captain_id).await?;
    }

    store.delete_team(team.clone()).await?;

    debug!(
        "Removed team {} after reverting {} matches",
        team.id,
        matches.len()
    );

    Ok(team)
}

/// Fail with RosterFull when the team's playing XI has no free slot
///
/// `exclude` is the profile being saved, which never counts against itself.
pub async fn check_playing_slot<S>(store: &S, team_id: i32, exclude: Option<i32>) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    let active = store.count_active_players(team_id, exclude).await?;

    if active >= PLAYING_XI as u64 {
        warn!(
            "Rejected playing XI change for team {}: {} players already active",
            team_id, active
        );
        return Err(LeagueError::RosterFull {
            team_id,
            limit: PLAYING_XI,
        });
    }

    Ok(())
}

async fn vet_profile_owner<S>(store: &S, user_id: i32, profile_id: Option<i32>) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    let user = store
        .get_user(user_id)
        .await?
        .ok_or(LeagueError::InvalidReference {
            field: "user_id",
            entity: EntityKind::User,
            id: user_id,
        })?;

    if user.role != UserRole::Player {
        return Err(LeagueError::RoleViolation {
            field: "user_id",
            user_id,
            expected: UserRole::Player,
            actual: user.role,
        });
    }

    if let Some(existing) = store.find_player_by_user(user_id).await? {
        if Some(existing.id) != profile_id {
            return Err(LeagueError::DuplicateProfile { user_id });
        }
    }

    Ok(())
}

async fn require_team<S>(store: &S, team_id: i32) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    match store.get_team(team_id).await? {
        Some(_) => Ok(()),
        None => Err(LeagueError::InvalidReference {
            field: "team",
            entity: EntityKind::Team,
            id: team_id,
        }),
    }
}

pub async fn create_player<S>(store: &S, input: &PlayerInput) -> LeagueResult<player_profile::Model>
where
    S: EntityStore + ?Sized,
{
    vet_profile_owner(store, input.user_id, None).await?;
    require_team(store, input.team_id).await?;

    if input.is_playing {
        check_playing_slot(store, input.team_id, None).await?;
    }

    let record = player_profile::Model {
        id: 0,
        user_id: input.user_id,
        age: input.age,
        player_type: input.player_type,
        team_id: input.team_id,
        matches_played: 0,
        total_runs: input.total_runs,
        wickets: input.wickets,
        is_playing: input.is_playing,
    };

    Ok(store.insert_player(record).await?)
}

pub async fn update_player<S>(
    store: &S,
    id: i32,
    patch: PlayerPatch,
) -> LeagueResult<player_profile::Model>
where
    S: EntityStore + ?Sized,
{
    let mut player = load_player(store, id).await?;

    if let Some(user_id) = patch.user_id.filter(|u| *u != player.user_id) {
        vet_profile_owner(store, user_id, Some(id)).await?;
        player.user_id = user_id;
    }
    if let Some(team_id) = patch.team_id.filter(|t| *t != player.team_id) {
        require_team(store, team_id).await?;
        player.team_id = team_id;
    }
    if let Some(is_playing) = patch.is_playing {
        player.is_playing = is_playing;
    }

    if player.is_playing {
        check_playing_slot(store, player.team_id, Some(id)).await?;
    }

    if let Some(age) = patch.age {
        player.age = age;
    }
    if let Some(player_type) = patch.player_type {
        player.player_type = player_type;
    }
    if let Some(total_runs) = patch.total_runs {
        player.total_runs = total_runs;
    }
    if let Some(wickets) = patch.wickets {
        player.wickets = wickets;
    }

    Ok(store.save_player(&player).await?)
}

pub async fn delete_player<S>(store: &S, id: i32) -> LeagueResult<player_profile::Model>
where
    S: EntityStore + ?Sized,
{
    let player = load_player(store, id).await?;
    store.delete_player(player.clone()).await?;
    Ok(player)
}
