//! Team entity with its standings counters

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub country: String,

    /// User with role CAPTAIN, if one is assigned
    pub captain_id: Option<i32>,

    pub matches_played: i32,

    pub wins: i32,

    pub lost: i32,

    pub draw: i32,

    /// Always `2 * wins + draw`; rewritten on every counter change
    pub points: i32,

    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CaptainId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Captain,

    /// Team roster
    #[sea_orm(has_many = "super::player_profile::Entity")]
    Players,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Captain.def()
    }
}

impl Related<super::player_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Players.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
