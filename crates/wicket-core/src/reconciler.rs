//! Match result reconciliation
//!
//! Keeps team standings and player match counts equal to what the stored
//! matches imply. Writing a match applies its outcome; rewriting it first
//! reverts the outcome that was applied last time; deleting it reverts and
//! removes it. All of it runs on the store the caller hands in, which the
//! `League` service binds to a single transaction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;
use wicket_db::{cricket_match, player_profile};

use crate::error::{EntityKind, LeagueError, LeagueResult};
use crate::stats::{adjust_player, adjust_team, check_winner, compute_delta, Direction, Outcome};
use crate::store::EntityStore;

/// Full set of match fields for a create or a replacing update
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchInput {
    pub date: NaiveDate,
    pub venue: String,
    pub team1_id: i32,
    pub team2_id: i32,
    /// `None` records a draw
    pub winner_id: Option<i32>,
}

/// Partial match update
///
/// `winner_id` is tri-state: `None` leaves the winner alone,
/// `Some(None)` turns the match into a draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPatch {
    pub date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub team1_id: Option<i32>,
    pub team2_id: Option<i32>,
    pub winner_id: Option<Option<i32>>,
}

impl MatchPatch {
    /// Fill the gaps of the patch from the stored match
    pub fn merge(self, current: &cricket_match::Model) -> MatchInput {
        MatchInput {
            date: self.date.unwrap_or(current.date),
            venue: self.venue.unwrap_or_else(|| current.venue.clone()),
            team1_id: self.team1_id.unwrap_or(current.team1_id),
            team2_id: self.team2_id.unwrap_or(current.team2_id),
            winner_id: self.winner_id.unwrap_or(current.winner_id),
        }
    }
}

pub async fn load_match<S>(store: &S, id: i32) -> LeagueResult<cricket_match::Model>
where
    S: EntityStore + ?Sized,
{
    store
        .get_match(id)
        .await?
        .ok_or(LeagueError::NotFound {
            entity: EntityKind::Match,
            id,
        })
}

async fn require_team<S>(store: &S, field: &'static str, id: i32) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    match store.get_team(id).await? {
        Some(_) => Ok(()),
        None => Err(LeagueError::InvalidReference {
            field,
            entity: EntityKind::Team,
            id,
        }),
    }
}

/// Record a match and bring the affected counters in line with it
///
/// With `existing_id` the stored match is replaced: its previous outcome is
/// reverted against the players active right now, then the new outcome is
/// applied. Validation happens before the first write.
pub async fn save_match<S>(
    store: &S,
    input: &MatchInput,
    existing_id: Option<i32>,
) -> LeagueResult<cricket_match::Model>
where
    S: EntityStore + ?Sized,
{
    let previous = match existing_id {
        Some(id) => Some(load_match(store, id).await?),
        None => None,
    };

    check_winner(input.team1_id, input.team2_id, input.winner_id)?;
    require_team(store, "team1", input.team1_id).await?;
    require_team(store, "team2", input.team2_id).await?;

    let record = cricket_match::Model {
        id: previous.as_ref().map(|m| m.id).unwrap_or_default(),
        date: input.date,
        venue: input.venue.clone(),
        team1_id: input.team1_id,
        team2_id: input.team2_id,
        winner_id: input.winner_id,
    };

    let record = match previous {
        Some(previous) => {
            revert_outcome(store, &previous).await?;
            store.save_match(&record).await?
        }
        None => store.insert_match(record).await?,
    };

    apply_outcome(store, &record).await?;

    debug!(
        "Reconciled match {} ({} vs {}, winner {:?})",
        record.id, record.team1_id, record.team2_id, record.winner_id
    );

    Ok(record)
}

/// Revert a stored match's outcome and delete it
pub async fn delete_match<S>(store: &S, id: i32) -> LeagueResult<cricket_match::Model>
where
    S: EntityStore + ?Sized,
{
    let record = load_match(store, id).await?;

    revert_outcome(store, &record).await?;
    store.delete_match(record.clone()).await?;

    debug!("Deleted match {} and reverted its outcome", record.id);

    Ok(record)
}

pub async fn apply_outcome<S>(store: &S, record: &cricket_match::Model) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    push_outcome(store, record, Direction::Apply).await
}

pub async fn revert_outcome<S>(store: &S, record: &cricket_match::Model) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    push_outcome(store, record, Direction::Revert).await
}

async fn push_outcome<S>(
    store: &S,
    record: &cricket_match::Model,
    direction: Direction,
) -> LeagueResult<()>
where
    S: EntityStore + ?Sized,
{
    let team1_active = store.list_active_players(record.team1_id).await?;
    let team2_active = if record.team2_id == record.team1_id {
        team1_active.clone()
    } else {
        store.list_active_players(record.team2_id).await?
    };

    let team1_ids: Vec<i32> = team1_active.iter().map(|p| p.id).collect();
    let team2_ids: Vec<i32> = team2_active.iter().map(|p| p.id).collect();

    let delta = compute_delta(&Outcome {
        team1: record.team1_id,
        team2: record.team2_id,
        winner: record.winner_id,
        team1_active: &team1_ids,
        team2_active: &team2_ids,
    })?;

    for (team_id, team_delta) in &delta.teams {
        let mut team = store
            .get_team(*team_id)
            .await?
            .ok_or(LeagueError::NotFound {
                entity: EntityKind::Team,
                id: *team_id,
            })?;
        adjust_team(&mut team, team_delta, direction);
        store.save_team(&team).await?;
    }

    let mut players: BTreeMap<i32, player_profile::Model> = team1_active
        .into_iter()
        .chain(team2_active)
        .map(|p| (p.id, p))
        .collect();

    for (player_id, matches) in &delta.players {
        if let Some(player) = players.get_mut(player_id) {
            adjust_player(player, *matches, direction);
            store.save_player(player).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> cricket_match::Model {
        cricket_match::Model {
            id: 4,
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            venue: "Lord's".to_string(),
            team1_id: 1,
            team2_id: 2,
            winner_id: Some(1),
        }
    }

    #[test]
    fn test_empty_patch_keeps_stored_fields() {
        let input = MatchPatch::default().merge(&stored());

        assert_eq!(input.venue, "Lord's");
        assert_eq!(input.team1_id, 1);
        assert_eq!(input.team2_id, 2);
        assert_eq!(input.winner_id, Some(1));
    }

    #[test]
    fn test_patch_can_clear_winner() {
        let patch = MatchPatch {
            winner_id: Some(None),
            venue: Some("Oval".to_string()),
            ..Default::default()
        };
        let input = patch.merge(&stored());

        assert_eq!(input.winner_id, None);
        assert_eq!(input.venue, "Oval");
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
    }
}
