//! Stat accumulation for match outcomes
//!
//! Pure computation: given the outcome of one match, produce the exact
//! counter movement it causes on the two teams and on every player active
//! for either side. Applying a delta and reverting the same delta are exact
//! inverses, which is what lets the reconciler undo a stored outcome before
//! recording its replacement.

use std::collections::BTreeMap;

use wicket_db::{player_profile, team};

use crate::error::{LeagueError, LeagueResult};

pub const POINTS_PER_WIN: i32 = 2;
pub const POINTS_PER_DRAW: i32 = 1;

/// Standings points for a win/draw record
pub fn points_for(wins: i32, draw: i32) -> i32 {
    POINTS_PER_WIN * wins + POINTS_PER_DRAW * draw
}

/// Counter movement for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamDelta {
    pub matches_played: i32,
    pub wins: i32,
    pub lost: i32,
    pub draw: i32,
}

impl TeamDelta {
    fn merge(&mut self, other: TeamDelta) {
        self.matches_played += other.matches_played;
        self.wins += other.wins;
        self.lost += other.lost;
        self.draw += other.draw;
    }
}

/// Standings counters of a team, detached from the stored row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamCounters {
    pub matches_played: i32,
    pub wins: i32,
    pub lost: i32,
    pub draw: i32,
}

impl TeamCounters {
    pub fn of(team: &team::Model) -> Self {
        Self {
            matches_played: team.matches_played,
            wins: team.wins,
            lost: team.lost,
            draw: team.draw,
        }
    }

    pub fn points(&self) -> i32 {
        points_for(self.wins, self.draw)
    }

    pub fn apply(&mut self, delta: &TeamDelta) {
        self.matches_played += delta.matches_played;
        self.wins += delta.wins;
        self.lost += delta.lost;
        self.draw += delta.draw;
    }

    /// Undo a previously applied delta, never going below zero
    pub fn revert(&mut self, delta: &TeamDelta) {
        self.matches_played = (self.matches_played - delta.matches_played).max(0);
        self.wins = (self.wins - delta.wins).max(0);
        self.lost = (self.lost - delta.lost).max(0);
        self.draw = (self.draw - delta.draw).max(0);
    }

    /// Copy the counters onto a team row and re-derive its points
    pub fn write_to(&self, team: &mut team::Model) {
        team.matches_played = self.matches_played;
        team.wins = self.wins;
        team.lost = self.lost;
        team.draw = self.draw;
        team.points = self.points();
    }
}

/// Which way a delta is being pushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Revert,
}

/// Everything needed to score one match
#[derive(Debug, Clone, Copy)]
pub struct Outcome<'a> {
    pub team1: i32,
    pub team2: i32,
    /// `None` is a draw
    pub winner: Option<i32>,
    /// Player ids with `is_playing = true` on team1
    pub team1_active: &'a [i32],
    /// Player ids with `is_playing = true` on team2
    pub team2_active: &'a [i32],
}

/// Counter movement caused by one outcome, keyed by row id
///
/// Keys are merged, so a self-match (team1 == team2) lands on a single entry
/// that carries both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchDelta {
    pub teams: BTreeMap<i32, TeamDelta>,
    /// matches_played increment per player id
    pub players: BTreeMap<i32, i32>,
}

impl MatchDelta {
    pub fn team(&self, team_id: i32) -> TeamDelta {
        self.teams.get(&team_id).copied().unwrap_or_default()
    }

    pub fn player(&self, player_id: i32) -> i32 {
        self.players.get(&player_id).copied().unwrap_or(0)
    }

    fn add_team(&mut self, team_id: i32, delta: TeamDelta) {
        self.teams.entry(team_id).or_default().merge(delta);
    }

    fn add_players(&mut self, players: &[i32]) {
        for id in players {
            *self.players.entry(*id).or_insert(0) += 1;
        }
    }
}

/// Check that a winner, if present, is one of the two sides
pub fn check_winner(team1: i32, team2: i32, winner: Option<i32>) -> LeagueResult<()> {
    match winner {
        Some(w) if w != team1 && w != team2 => Err(LeagueError::InvalidOutcome {
            winner: w,
            team1,
            team2,
        }),
        _ => Ok(()),
    }
}

/// Compute the counter movement an outcome causes
///
/// matches_played moves for both teams and every active player; the winner
/// gains a win and the other side a loss, or both sides gain a draw.
/// Runs and wickets are never touched here.
pub fn compute_delta(outcome: &Outcome<'_>) -> LeagueResult<MatchDelta> {
    check_winner(outcome.team1, outcome.team2, outcome.winner)?;

    let played = TeamDelta {
        matches_played: 1,
        ..TeamDelta::default()
    };
    let won = TeamDelta {
        wins: 1,
        ..played
    };
    let lost = TeamDelta {
        lost: 1,
        ..played
    };
    let drawn = TeamDelta {
        draw: 1,
        ..played
    };

    let (side1, side2) = match outcome.winner {
        Some(w) if w == outcome.team1 => (won, lost),
        Some(_) => (lost, won),
        None => (drawn, drawn),
    };

    let mut delta = MatchDelta::default();
    delta.add_team(outcome.team1, side1);
    delta.add_team(outcome.team2, side2);
    delta.add_players(outcome.team1_active);
    delta.add_players(outcome.team2_active);

    Ok(delta)
}

/// Push a team delta onto a team row, re-deriving points
pub fn adjust_team(team: &mut team::Model, delta: &TeamDelta, direction: Direction) {
    let mut counters = TeamCounters::of(team);
    match direction {
        Direction::Apply => counters.apply(delta),
        Direction::Revert => counters.revert(delta),
    }
    counters.write_to(team);
}

/// Push a matches_played movement onto a player row
pub fn adjust_player(player: &mut player_profile::Model, matches: i32, direction: Direction) {
    player.matches_played = match direction {
        Direction::Apply => player.matches_played + matches,
        Direction::Revert => (player.matches_played - matches).max(0),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: i32 = 1;
    const B: i32 = 2;

    fn outcome<'a>(winner: Option<i32>, a: &'a [i32], b: &'a [i32]) -> Outcome<'a> {
        Outcome {
            team1: A,
            team2: B,
            winner,
            team1_active: a,
            team2_active: b,
        }
    }

    #[test]
    fn test_team1_win() {
        let delta = compute_delta(&outcome(Some(A), &[10, 11], &[20])).unwrap();

        assert_eq!(
            delta.team(A),
            TeamDelta {
                matches_played: 1,
                wins: 1,
                lost: 0,
                draw: 0
            }
        );
        assert_eq!(
            delta.team(B),
            TeamDelta {
                matches_played: 1,
                wins: 0,
                lost: 1,
                draw: 0
            }
        );
        assert_eq!(delta.player(10), 1);
        assert_eq!(delta.player(11), 1);
        assert_eq!(delta.player(20), 1);
        assert_eq!(delta.players.len(), 3);
    }

    #[test]
    fn test_team2_win() {
        let delta = compute_delta(&outcome(Some(B), &[], &[])).unwrap();

        assert_eq!(delta.team(A).lost, 1);
        assert_eq!(delta.team(A).wins, 0);
        assert_eq!(delta.team(B).wins, 1);
        assert_eq!(delta.team(B).lost, 0);
        assert!(delta.players.is_empty());
    }

    #[test]
    fn test_draw_credits_both_sides() {
        let delta = compute_delta(&outcome(None, &[], &[])).unwrap();

        assert_eq!(delta.team(A).draw, 1);
        assert_eq!(delta.team(B).draw, 1);
        assert_eq!(delta.team(A).wins + delta.team(B).wins, 0);
        assert_eq!(delta.team(A).lost + delta.team(B).lost, 0);
    }

    #[test]
    fn test_foreign_winner_rejected() {
        let err = compute_delta(&outcome(Some(99), &[], &[])).unwrap_err();
        assert!(matches!(
            err,
            LeagueError::InvalidOutcome {
                winner: 99,
                team1: A,
                team2: B
            }
        ));
    }

    #[test]
    fn test_self_match_merges_both_sides() {
        let active = [7];
        let delta = compute_delta(&Outcome {
            team1: A,
            team2: A,
            winner: Some(A),
            team1_active: &active,
            team2_active: &active,
        })
        .unwrap();

        assert_eq!(delta.teams.len(), 1);
        assert_eq!(
            delta.team(A),
            TeamDelta {
                matches_played: 2,
                wins: 1,
                lost: 1,
                draw: 0
            }
        );
        assert_eq!(delta.player(7), 2);
    }

    #[test]
    fn test_revert_undoes_apply() {
        for winner in [Some(A), Some(B), None] {
            let delta = compute_delta(&outcome(winner, &[], &[])).unwrap();
            for team_id in [A, B] {
                let mut counters = TeamCounters::default();
                counters.apply(&delta.team(team_id));
                counters.revert(&delta.team(team_id));
                assert_eq!(counters, TeamCounters::default());
                assert_eq!(counters.points(), 0);
            }
        }
    }

    #[test]
    fn test_revert_saturates_at_zero() {
        let delta = compute_delta(&outcome(Some(A), &[], &[])).unwrap();

        let mut counters = TeamCounters::default();
        counters.revert(&delta.team(A));
        counters.revert(&delta.team(A));

        assert_eq!(counters, TeamCounters::default());
    }

    #[test]
    fn test_points_derivation() {
        for wins in 0..5 {
            for draw in 0..5 {
                let counters = TeamCounters {
                    matches_played: wins + draw,
                    wins,
                    lost: 0,
                    draw,
                };
                assert_eq!(counters.points(), 2 * wins + draw);
            }
        }
    }

    #[test]
    fn test_adjust_player_saturates() {
        let mut player = player_profile::Model {
            id: 1,
            user_id: 1,
            age: 20,
            player_type: wicket_db::PlayerType::Batter,
            team_id: A,
            matches_played: 0,
            total_runs: 40,
            wickets: 0,
            is_playing: true,
        };

        adjust_player(&mut player, 1, Direction::Revert);
        assert_eq!(player.matches_played, 0);

        adjust_player(&mut player, 2, Direction::Apply);
        assert_eq!(player.matches_played, 2);
        assert_eq!(player.total_runs, 40);
    }
}
