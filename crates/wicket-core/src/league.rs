//! Transactional entry points used by the request layer
//!
//! Each write opens one transaction, runs the reconciler or roster rules
//! against a [`SeaStore`] bound to it, and commits. Returning early on an
//! error drops the transaction, which rolls every write of that call back.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{debug, info};
use wicket_db::{cricket_match, player_profile, team, user, UserRole};

use crate::error::{EntityKind, LeagueError, LeagueResult};
use crate::reconciler::{self, MatchInput, MatchPatch};
use crate::roster::{self, PlayerInput, PlayerPatch, TeamInput, TeamPatch};
use crate::store::{EntityStore, SeaStore};

/// Zero-based index of a 1-based page, or `None` when the page starts past
/// the largest OFFSET the database accepts
fn page_index(page: u64, page_size: u64) -> Option<u64> {
    let index = page.saturating_sub(1);
    index
        .checked_mul(page_size)
        .filter(|offset| *offset <= i64::MAX as u64)
        .map(|_| index)
}

/// One page of a listing plus the total row count
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Fields of a newly registered account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// A profile together with its owning user
pub type PlayerWithUser = (player_profile::Model, Option<user::Model>);

#[derive(Clone)]
pub struct League {
    db: DatabaseConnection,
}

impl League {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // Matches

    pub async fn create_match(&self, input: MatchInput) -> LeagueResult<cricket_match::Model> {
        let txn = self.db.begin().await?;
        let record = reconciler::save_match(&SeaStore::new(&txn), &input, None).await?;
        txn.commit().await?;

        info!(
            "Match {} created: team {} vs team {} at {}",
            record.id, record.team1_id, record.team2_id, record.venue
        );
        Ok(record)
    }

    /// Merge a partial update onto the stored match and reconcile
    pub async fn update_match(
        &self,
        id: i32,
        patch: MatchPatch,
    ) -> LeagueResult<cricket_match::Model> {
        let txn = self.db.begin().await?;
        let store = SeaStore::new(&txn);

        let current = reconciler::load_match(&store, id).await?;
        let input = patch.merge(&current);
        let record = reconciler::save_match(&store, &input, Some(id)).await?;

        txn.commit().await?;

        info!("Match {} updated (winner {:?})", record.id, record.winner_id);
        Ok(record)
    }

    pub async fn delete_match(&self, id: i32) -> LeagueResult<cricket_match::Model> {
        let txn = self.db.begin().await?;
        let record = reconciler::delete_match(&SeaStore::new(&txn), id).await?;
        txn.commit().await?;

        info!("Match {} deleted", id);
        Ok(record)
    }

    pub async fn get_match(&self, id: i32) -> LeagueResult<cricket_match::Model> {
        reconciler::load_match(&SeaStore::new(&self.db), id).await
    }

    pub async fn list_matches(
        &self,
        page: u64,
        page_size: u64,
    ) -> LeagueResult<Page<cricket_match::Model>> {
        let paginator = cricket_match::Entity::find()
            .order_by_asc(cricket_match::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let items = match page_index(page, page_size) {
            Some(index) => paginator.fetch_page(index).await?,
            None => Vec::new(),
        };

        debug!("Listed {} of {} matches (page {})", items.len(), total, page);
        Ok(Page { items, total })
    }

    // Teams

    pub async fn create_team(&self, input: TeamInput) -> LeagueResult<team::Model> {
        let txn = self.db.begin().await?;
        let team = roster::create_team(&SeaStore::new(&txn), &input).await?;
        txn.commit().await?;

        info!("Team {} created: {}", team.id, team.name);
        Ok(team)
    }

    pub async fn update_team(&self, id: i32, patch: TeamPatch) -> LeagueResult<team::Model> {
        let txn = self.db.begin().await?;
        let team = roster::update_team(&SeaStore::new(&txn), id, patch).await?;
        txn.commit().await?;

        info!("Team {} updated", team.id);
        Ok(team)
    }

    /// Assign or clear a team's captain
    pub async fn set_team_captain(
        &self,
        id: i32,
        captain_id: Option<i32>,
    ) -> LeagueResult<team::Model> {
        self.update_team(
            id,
            TeamPatch {
                captain_id: Some(captain_id),
                ..TeamPatch::default()
            },
        )
        .await
    }

    pub async fn delete_team(&self, id: i32) -> LeagueResult<team::Model> {
        let txn = self.db.begin().await?;
        let team = roster::remove_team(&SeaStore::new(&txn), id).await?;
        txn.commit().await?;

        info!("Team {} deleted: {}", team.id, team.name);
        Ok(team)
    }

    pub async fn get_team(&self, id: i32) -> LeagueResult<team::Model> {
        roster::load_team(&SeaStore::new(&self.db), id).await
    }

    pub async fn list_teams(&self, page: u64, page_size: u64) -> LeagueResult<Page<team::Model>> {
        let paginator = team::Entity::find()
            .order_by_asc(team::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let items = match page_index(page, page_size) {
            Some(index) => paginator.fetch_page(index).await?,
            None => Vec::new(),
        };

        debug!("Listed {} of {} teams (page {})", items.len(), total, page);
        Ok(Page { items, total })
    }

    /// Profile ids on each of the given teams
    pub async fn roster_ids(&self, team_ids: &[i32]) -> LeagueResult<BTreeMap<i32, Vec<i32>>> {
        let players = player_profile::Entity::find()
            .filter(player_profile::Column::TeamId.is_in(team_ids.iter().copied()))
            .order_by_asc(player_profile::Column::Id)
            .all(&self.db)
            .await?;

        let mut rosters: BTreeMap<i32, Vec<i32>> =
            team_ids.iter().map(|id| (*id, Vec::new())).collect();
        for player in players {
            rosters.entry(player.team_id).or_default().push(player.id);
        }

        Ok(rosters)
    }

    // Player profiles

    pub async fn create_player_profile(
        &self,
        input: PlayerInput,
    ) -> LeagueResult<player_profile::Model> {
        let txn = self.db.begin().await?;
        let player = roster::create_player(&SeaStore::new(&txn), &input).await?;
        txn.commit().await?;

        info!(
            "Player profile {} created for user {} on team {}",
            player.id, player.user_id, player.team_id
        );
        Ok(player)
    }

    pub async fn update_player_profile(
        &self,
        id: i32,
        patch: PlayerPatch,
    ) -> LeagueResult<player_profile::Model> {
        let txn = self.db.begin().await?;
        let player = roster::update_player(&SeaStore::new(&txn), id, patch).await?;
        txn.commit().await?;

        info!("Player profile {} updated", player.id);
        Ok(player)
    }

    pub async fn delete_player_profile(&self, id: i32) -> LeagueResult<player_profile::Model> {
        let txn = self.db.begin().await?;
        let player = roster::delete_player(&SeaStore::new(&txn), id).await?;
        txn.commit().await?;

        info!("Player profile {} deleted", id);
        Ok(player)
    }

    pub async fn get_player_profile(&self, id: i32) -> LeagueResult<PlayerWithUser> {
        player_profile::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
            .ok_or(LeagueError::NotFound {
                entity: EntityKind::Player,
                id,
            })
    }

    pub async fn list_player_profiles(
        &self,
        page: u64,
        page_size: u64,
    ) -> LeagueResult<Page<PlayerWithUser>> {
        let paginator = player_profile::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(player_profile::Column::Id)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let items = match page_index(page, page_size) {
            Some(index) => paginator.fetch_page(index).await?,
            None => Vec::new(),
        };

        debug!("Listed {} of {} player profiles (page {})", items.len(), total, page);
        Ok(Page { items, total })
    }

    // Users

    pub async fn register_user(&self, new_user: NewUser) -> LeagueResult<user::Model> {
        let txn = self.db.begin().await?;
        let store = SeaStore::new(&txn);

        if store.find_user_by_username(&new_user.username).await?.is_some() {
            return Err(LeagueError::UsernameTaken {
                username: new_user.username,
            });
        }

        let user = store
            .insert_user(user::Model {
                id: 0,
                username: new_user.username,
                email: new_user.email,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                password_hash: new_user.password_hash,
                role: new_user.role,
                created_at: Utc::now(),
            })
            .await?;

        txn.commit().await?;

        info!("Registered user {}", user.label());
        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> LeagueResult<user::Model> {
        SeaStore::new(&self.db)
            .get_user(id)
            .await?
            .ok_or(LeagueError::NotFound {
                entity: EntityKind::User,
                id,
            })
    }

    pub async fn find_user_by_username(&self, username: &str) -> LeagueResult<Option<user::Model>> {
        Ok(SeaStore::new(&self.db).find_user_by_username(username).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_index() {
        assert_eq!(page_index(1, 10), Some(0));
        assert_eq!(page_index(3, 10), Some(2));
        assert_eq!(page_index(u64::MAX, 100), None);
        assert_eq!(page_index(u64::MAX / 2, 2), None);
    }
}
