//! Database entities

pub mod cricket_match;
pub mod player_profile;
pub mod team;
pub mod user;

pub use player_profile::PlayerType;
pub use user::UserRole;

pub use cricket_match::Entity as Match;
pub use player_profile::Entity as PlayerProfile;
pub use team::Entity as Team;
pub use user::Entity as User;

/// Returned when parsing a role or player type from an unknown string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

pub mod prelude {
    pub use super::cricket_match::Entity as Match;
    pub use super::player_profile::Entity as PlayerProfile;
    pub use super::team::Entity as Team;
    pub use super::user::Entity as User;
}
