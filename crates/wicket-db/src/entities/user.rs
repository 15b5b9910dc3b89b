//! User entity: login identity plus exactly one league role

use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::UnknownVariant;

/// League role held by a user
///
/// Captains fall back to `Player` when they lose their team; no other role
/// transition happens automatically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,

    #[sea_orm(string_value = "ORGANISER")]
    Organiser,

    #[sea_orm(string_value = "CAPTAIN")]
    Captain,

    #[sea_orm(string_value = "PLAYER")]
    Player,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Organiser,
        UserRole::Captain,
        UserRole::Player,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Organiser => "ORGANISER",
            UserRole::Captain => "CAPTAIN",
            UserRole::Player => "PLAYER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    /// Case-insensitive, so `"captain"` and `"CAPTAIN"` both parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "role",
                value: s.to_string(),
            })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login name (unique)
    #[sea_orm(unique)]
    pub username: String,

    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: ChronoDateTimeUtc,
}

impl Model {
    /// "username (ROLE)", the form used in request logs
    pub fn label(&self) -> String {
        format!("{} ({})", self.username, self.role)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A player user owns at most one profile
    #[sea_orm(has_one = "super::player_profile::Entity")]
    PlayerProfile,

    /// A captain user captains at most one team
    #[sea_orm(has_many = "super::team::Entity")]
    CaptainedTeams,
}

impl Related<super::player_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerProfile.def()
    }
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaptainedTeams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("captain".parse::<UserRole>().unwrap(), UserRole::Captain);
        assert_eq!("ORGANISER".parse::<UserRole>().unwrap(), UserRole::Organiser);
        assert_eq!(" Admin ".parse::<UserRole>().unwrap(), UserRole::Admin);
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "INVALID".parse::<UserRole>().unwrap_err();
        assert_eq!(err.kind, "role");
        assert_eq!(err.to_string(), "unknown role 'INVALID'");
    }

    #[test]
    fn test_role_serializes_upper_case() {
        let json = serde_json::to_string(&UserRole::Organiser).unwrap();
        assert_eq!(json, "\"ORGANISER\"");
    }
}
