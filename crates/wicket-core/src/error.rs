//! Error kinds surfaced by league operations

use std::fmt;

use sea_orm::DbErr;
use thiserror::Error;
use wicket_db::UserRole;

/// Which kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Match,
    Team,
    Player,
    User,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Match => "Match",
            EntityKind::Team => "Team",
            EntityKind::Player => "Player",
            EntityKind::User => "User",
        })
    }
}

/// Errors raised by reconciliation, roster rules and the store
///
/// Every variant except `TransactionFailure` is a rejected precondition and
/// is raised before the operation writes anything.
#[derive(Debug, Error)]
pub enum LeagueError {
    /// The record addressed by the operation does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    /// A field of the input points at a record that does not exist
    #[error("Invalid pk \"{id}\" - {entity} does not exist.")]
    InvalidReference {
        field: &'static str,
        entity: EntityKind,
        id: i32,
    },

    #[error("User {user_id} has role {actual}, expected {expected}")]
    RoleViolation {
        field: &'static str,
        user_id: i32,
        expected: UserRole,
        actual: UserRole,
    },

    #[error("User {user_id} is already captain of team {team_id}")]
    AlreadyCaptain { user_id: i32, team_id: i32 },

    #[error("A team can only have {limit} players in the playing XI (team {team_id} is full)")]
    RosterFull { team_id: i32, limit: usize },

    #[error("Winner {winner} must be team1 ({team1}) or team2 ({team2})")]
    InvalidOutcome { winner: i32, team1: i32, team2: i32 },

    #[error("User {user_id} already has a player profile")]
    DuplicateProfile { user_id: i32 },

    #[error("A user with username '{username}' already exists")]
    UsernameTaken { username: String },

    /// The store failed; the whole operation was rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailure(#[from] DbErr),
}

impl LeagueError {
    /// Input field the error should be reported against, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LeagueError::InvalidReference { field, .. } => Some(*field),
            LeagueError::RoleViolation { field, .. } => Some(*field),
            LeagueError::AlreadyCaptain { .. } => Some("captain"),
            LeagueError::RosterFull { .. } => Some("is_playing"),
            LeagueError::InvalidOutcome { .. } => Some("winner"),
            LeagueError::DuplicateProfile { .. } => Some("user_id"),
            LeagueError::UsernameTaken { .. } => Some("username"),
            LeagueError::NotFound { .. } | LeagueError::TransactionFailure(_) => None,
        }
    }

    pub fn is_precondition(&self) -> bool {
        !matches!(self, LeagueError::TransactionFailure(_))
    }
}

pub type LeagueResult<T> = Result<T, LeagueError>;
