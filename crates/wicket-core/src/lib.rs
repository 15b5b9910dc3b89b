//! League rules for wicket
//!
//! - [`stats`]: pure counter movement for a match outcome
//! - [`reconciler`]: applies, reverts and re-applies outcomes as matches change
//! - [`roster`]: captaincy, the playing XI cap, team removal
//! - [`store`]: the persistence seam the rules run against
//! - [`league`]: one transaction per operation, for the request layer

pub mod error;
pub mod league;
pub mod reconciler;
pub mod roster;
pub mod stats;
pub mod store;

pub use error::{EntityKind, LeagueError, LeagueResult};
pub use league::{League, NewUser, Page, PlayerWithUser};
pub use reconciler::{MatchInput, MatchPatch};
pub use roster::{PlayerInput, PlayerPatch, TeamInput, TeamPatch, PLAYING_XI};
pub use stats::{compute_delta, MatchDelta, Outcome, TeamCounters, TeamDelta};
pub use store::{EntityStore, SeaStore};
