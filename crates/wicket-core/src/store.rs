//! Entity store seam between the league rules and the database
//!
//! The reconciler and roster rules only talk to [`EntityStore`], so every
//! lookup and write they make runs on whatever connection the store was
//! built over. [`SeaStore`] is built over an open `DatabaseTransaction` by
//! the `League` service; tests may build it over a plain connection.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use wicket_db::{cricket_match, player_profile, team, user};

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_match(&self, id: i32) -> Result<Option<cricket_match::Model>, DbErr>;

    async fn get_team(&self, id: i32) -> Result<Option<team::Model>, DbErr>;

    async fn get_user(&self, id: i32) -> Result<Option<user::Model>, DbErr>;

    async fn get_player(&self, id: i32) -> Result<Option<player_profile::Model>, DbErr>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr>;

    async fn find_player_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<player_profile::Model>, DbErr>;

    /// Profiles with `is_playing = true` on a team, ordered by id
    async fn list_active_players(&self, team_id: i32) -> Result<Vec<player_profile::Model>, DbErr>;

    /// Number of active profiles on a team, not counting `excluding`
    async fn count_active_players(&self, team_id: i32, excluding: Option<i32>)
        -> Result<u64, DbErr>;

    /// Team captained by a user, if any
    async fn find_captain_of(&self, user_id: i32) -> Result<Option<team::Model>, DbErr>;

    /// Matches where the team plays on either side, ordered by id
    async fn matches_involving(&self, team_id: i32) -> Result<Vec<cricket_match::Model>, DbErr>;

    /// Insert a new match; the id on `record` is ignored
    async fn insert_match(&self, record: cricket_match::Model)
        -> Result<cricket_match::Model, DbErr>;

    /// Overwrite every column of an existing match
    async fn save_match(&self, record: &cricket_match::Model)
        -> Result<cricket_match::Model, DbErr>;

    async fn insert_team(&self, record: team::Model) -> Result<team::Model, DbErr>;

    async fn save_team(&self, record: &team::Model) -> Result<team::Model, DbErr>;

    async fn insert_player(
        &self,
        record: player_profile::Model,
    ) -> Result<player_profile::Model, DbErr>;

    async fn save_player(
        &self,
        record: &player_profile::Model,
    ) -> Result<player_profile::Model, DbErr>;

    async fn insert_user(&self, record: user::Model) -> Result<user::Model, DbErr>;

    async fn save_user(&self, record: &user::Model) -> Result<user::Model, DbErr>;

    async fn delete_match(&self, record: cricket_match::Model) -> Result<(), DbErr>;

    /// Delete a team; its profiles and matches go with it
    async fn delete_team(&self, record: team::Model) -> Result<(), DbErr>;

    async fn delete_player(&self, record: player_profile::Model) -> Result<(), DbErr>;
}

/// [`EntityStore`] over any sea-orm connection or transaction
pub struct SeaStore<'c, C> {
    conn: &'c C,
}

impl<'c, C> SeaStore<'c, C>
where
    C: ConnectionTrait + Sync,
{
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c, C> EntityStore for SeaStore<'c, C>
where
    C: ConnectionTrait + Sync,
{
    async fn get_match(&self, id: i32) -> Result<Option<cricket_match::Model>, DbErr> {
        cricket_match::Entity::find_by_id(id).one(self.conn).await
    }

    async fn get_team(&self, id: i32) -> Result<Option<team::Model>, DbErr> {
        team::Entity::find_by_id(id).one(self.conn).await
    }

    async fn get_user(&self, id: i32) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find_by_id(id).one(self.conn).await
    }

    async fn get_player(&self, id: i32) -> Result<Option<player_profile::Model>, DbErr> {
        player_profile::Entity::find_by_id(id).one(self.conn).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn)
            .await
    }

    async fn find_player_by_user(
        &self,
        user_id: i32,
    ) -> Result<Option<player_profile::Model>, DbErr> {
        player_profile::Entity::find()
            .filter(player_profile::Column::UserId.eq(user_id))
            .one(self.conn)
            .await
    }

    async fn list_active_players(&self, team_id: i32) -> Result<Vec<player_profile::Model>, DbErr> {
        player_profile::Entity::find()
            .filter(player_profile::Column::TeamId.eq(team_id))
            .filter(player_profile::Column::IsPlaying.eq(true))
            .order_by_asc(player_profile::Column::Id)
            .all(self.conn)
            .await
    }

    async fn count_active_players(
        &self,
        team_id: i32,
        excluding: Option<i32>,
    ) -> Result<u64, DbErr> {
        let mut query = player_profile::Entity::find()
            .filter(player_profile::Column::TeamId.eq(team_id))
            .filter(player_profile::Column::IsPlaying.eq(true));

        if let Some(id) = excluding {
            query = query.filter(player_profile::Column::Id.ne(id));
        }

        query.count(self.conn).await
    }

    async fn find_captain_of(&self, user_id: i32) -> Result<Option<team::Model>, DbErr> {
        team::Entity::find()
            .filter(team::Column::CaptainId.eq(user_id))
            .one(self.conn)
            .await
    }

    async fn matches_involving(&self, team_id: i32) -> Result<Vec<cricket_match::Model>, DbErr> {
        cricket_match::Entity::find()
            .filter(
                Condition::any()
                    .add(cricket_match::Column::Team1Id.eq(team_id))
                    .add(cricket_match::Column::Team2Id.eq(team_id)),
            )
            .order_by_asc(cricket_match::Column::Id)
            .all(self.conn)
            .await
    }

    async fn insert_match(
        &self,
        record: cricket_match::Model,
    ) -> Result<cricket_match::Model, DbErr> {
        let mut active = record.into_active_model().reset_all();
        active.id = NotSet;
        active.insert(self.conn).await
    }

    async fn save_match(
        &self,
        record: &cricket_match::Model,
    ) -> Result<cricket_match::Model, DbErr> {
        record
            .clone()
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
    }

    async fn insert_team(&self, record: team::Model) -> Result<team::Model, DbErr> {
        let mut active = record.into_active_model().reset_all();
        active.id = NotSet;
        active.insert(self.conn).await
    }

    async fn save_team(&self, record: &team::Model) -> Result<team::Model, DbErr> {
        record
            .clone()
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
    }

    async fn insert_player(
        &self,
        record: player_profile::Model,
    ) -> Result<player_profile::Model, DbErr> {
        let mut active = record.into_active_model().reset_all();
        active.id = NotSet;
        active.insert(self.conn).await
    }

    async fn save_player(
        &self,
        record: &player_profile::Model,
    ) -> Result<player_profile::Model, DbErr> {
        record
            .clone()
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
    }

    async fn insert_user(&self, record: user::Model) -> Result<user::Model, DbErr> {
        let mut active = record.into_active_model().reset_all();
        active.id = NotSet;
        active.insert(self.conn).await
    }

    async fn save_user(&self, record: &user::Model) -> Result<user::Model, DbErr> {
        record
            .clone()
            .into_active_model()
            .reset_all()
            .update(self.conn)
            .await
    }

    async fn delete_match(&self, record: cricket_match::Model) -> Result<(), DbErr> {
        record.delete(self.conn).await?;
        Ok(())
    }

    async fn delete_team(&self, record: team::Model) -> Result<(), DbErr> {
        record.delete(self.conn).await?;
        Ok(())
    }

    async fn delete_player(&self, record: player_profile::Model) -> Result<(), DbErr> {
        record.delete(self.conn).await?;
        Ok(())
    }
}
