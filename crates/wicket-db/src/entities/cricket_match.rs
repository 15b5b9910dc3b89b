//! Match entity (`match` is a keyword, hence the module name)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub date: ChronoDate,

    pub venue: String,

    pub team1_id: i32,

    pub team2_id: i32,

    /// Either `team1_id` or `team2_id`; `None` records a draw
    pub winner_id: Option<i32>,
}

impl Model {
    pub fn involves(&self, team_id: i32) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::Team1Id",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team1,

    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::Team2Id",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team2,

    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::WinnerId",
        to = "super::team::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Winner,
}

impl ActiveModelBehavior for ActiveModel {}
