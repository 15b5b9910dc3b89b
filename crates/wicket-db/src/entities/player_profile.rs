//! PlayerProfile entity: a player user's place on a team roster

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// Playing role on the field
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerType {
    #[default]
    #[sea_orm(string_value = "BATTER")]
    Batter,

    #[sea_orm(string_value = "BOWLER")]
    Bowler,

    #[sea_orm(string_value = "ALL_ROUNDER")]
    AllRounder,

    #[sea_orm(string_value = "WICKET_KEEPER")]
    WicketKeeper,
}

impl PlayerType {
    pub const ALL: [PlayerType; 4] = [
        PlayerType::Batter,
        PlayerType::Bowler,
        PlayerType::AllRounder,
        PlayerType::WicketKeeper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerType::Batter => "BATTER",
            PlayerType::Bowler => "BOWLER",
            PlayerType::AllRounder => "ALL_ROUNDER",
            PlayerType::WicketKeeper => "WICKET_KEEPER",
        }
    }

    pub fn bats(&self) -> bool {
        !matches!(self, PlayerType::Bowler)
    }

    pub fn bowls(&self) -> bool {
        matches!(self, PlayerType::Bowler | PlayerType::AllRounder)
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "player type",
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning user (unique: one profile per user)
    #[sea_orm(unique)]
    pub user_id: i32,

    pub age: i32,

    #[sea_orm(column_name = "type")]
    pub player_type: PlayerType,

    pub team_id: i32,

    /// Bumped only by match reconciliation
    pub matches_played: i32,

    pub total_runs: i32,

    pub wickets: i32,

    /// Member of the team's playing XI
    pub is_playing: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_type_parse() {
        assert_eq!(
            "all_rounder".parse::<PlayerType>().unwrap(),
            PlayerType::AllRounder
        );
        assert!("SPINNER".parse::<PlayerType>().is_err());
    }

    #[test]
    fn test_player_type_skills() {
        assert!(PlayerType::WicketKeeper.bats());
        assert!(!PlayerType::WicketKeeper.bowls());
        assert!(PlayerType::AllRounder.bats() && PlayerType::AllRounder.bowls());
        assert!(!PlayerType::Bowler.bats());
    }
}
