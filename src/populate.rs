//! Demo league seeding
//!
//! Everything goes through `League`, so team standings and player match
//! counts come out of the recorded matches rather than being written
//! directly.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::info;
use wicket_auth::hash_password;
use wicket_core::{League, MatchInput, NewUser, PlayerInput, PlayerPatch, TeamInput, PLAYING_XI};
use wicket_db::{player_profile, PlayerType, UserRole};

const TEAMS: usize = 5;
const ORGANISERS: usize = 5;
const MATCHES: i64 = 20;
const MATCH_SPACING_DAYS: i64 = 9;
const SEASON_DAYS: i64 = 180;

const TEAM_NAMES: &[&str] = &[
    "Harbour Hawks", "Northern Lights", "Riverside Royals", "Summit Strikers", "Coastal Kings",
    "Valley Vipers", "Metro Mavericks", "Desert Falcons",
];
const COUNTRIES: &[&str] = &[
    "India", "England", "Australia", "South Africa", "New Zealand", "Pakistan", "Sri Lanka",
    "West Indies", "Bangladesh", "Afghanistan",
];
const FIRST_NAMES: &[&str] = &[
    "arjun", "oliver", "liam", "rahul", "jack", "kane", "babar", "dinesh", "joe", "mitchell",
    "shakib", "rashid", "kagiso", "tom", "virat", "steve", "ben", "quinton", "jason", "harry",
];
const LAST_NAMES: &[&str] = &[
    "sharma", "smith", "root", "khan", "patel", "williams", "stokes", "singh", "cummins", "brown",
    "perera", "ali", "taylor", "rabada", "jones",
];
const VENUES: &[&str] = &[
    "Lord's", "Eden Gardens", "Melbourne Cricket Ground", "Newlands", "The Oval", "Wankhede",
    "Basin Reserve", "Galle", "Kensington Oval", "Headingley",
];

pub struct Options {
    pub seed: Option<u64>,
    pub admin_password: String,
    pub user_password: String,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub teams: usize,
    pub organisers: usize,
    pub captains: usize,
    pub players: usize,
    pub matches: usize,
}

struct Seeder<'a> {
    league: &'a League,
    rng: StdRng,
    password_hash: String,
    next_user: usize,
}

impl Seeder<'_> {
    async fn user(&mut self, prefix: &str, role: UserRole) -> Result<wicket_db::user::Model> {
        let first = *FIRST_NAMES.choose(&mut self.rng).unwrap_or(&"player");
        let last = *LAST_NAMES.choose(&mut self.rng).unwrap_or(&"one");
        self.next_user += 1;

        let username = format!("{}{}_{}{}", prefix, first, last, self.next_user);
        let user = self
            .league
            .register_user(NewUser {
                email: format!("{}@example.com", username),
                username,
                first_name: first.to_string(),
                last_name: last.to_string(),
                password_hash: self.password_hash.clone(),
                role,
            })
            .await?;
        Ok(user)
    }

    async fn player(&mut self, team_id: i32, is_playing: bool) -> Result<player_profile::Model> {
        let user = self.user("", UserRole::Player).await?;
        let player_type = *PlayerType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&PlayerType::Batter);

        let player = self
            .league
            .create_player_profile(PlayerInput {
                user_id: user.id,
                age: self.rng.gen_range(18..=35),
                player_type,
                team_id,
                is_playing,
                total_runs: 0,
                wickets: 0,
            })
            .await?;
        Ok(player)
    }

    /// Add this match's runs and wickets to every active player of a team
    async fn score(&mut self, playing: &mut [player_profile::Model]) -> Result<()> {
        for player in playing.iter_mut() {
            let mut patch = PlayerPatch::default();
            if player.player_type.bats() {
                patch.total_runs = Some(player.total_runs + self.rng.gen_range(0..=50));
            }
            if player.player_type.bowls() {
                patch.wickets = Some(player.wickets + self.rng.gen_range(0..=3));
            }
            if patch == PlayerPatch::default() {
                continue;
            }
            *player = self.league.update_player_profile(player.id, patch).await?;
        }
        Ok(())
    }
}

pub async fn run(league: &League, options: Options) -> Result<Summary> {
    let rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut summary = Summary::default();

    let admin_hash = hash_password(&options.admin_password)?;
    league
        .register_user(NewUser {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: admin_hash,
            role: UserRole::Admin,
        })
        .await
        .context("Failed to create the admin user (is the database already populated?)")?;
    info!("Created admin user");

    let mut seeder = Seeder {
        league,
        rng,
        password_hash: hash_password(&options.user_password)?,
        next_user: 0,
    };

    for _ in 0..ORGANISERS {
        seeder.user("org_", UserRole::Organiser).await?;
        summary.organisers += 1;
    }
    info!("Created {} organisers", summary.organisers);

    let names: Vec<&str> = TEAM_NAMES
        .choose_multiple(&mut seeder.rng, TEAMS)
        .copied()
        .collect();

    // Active players per team, in team order
    let mut teams: Vec<(i32, Vec<player_profile::Model>)> = Vec::new();
    for name in names {
        let captain = seeder.user("captain_", UserRole::Captain).await?;
        summary.captains += 1;

        let country = *COUNTRIES.choose(&mut seeder.rng).unwrap_or(&"India");
        let team = league
            .create_team(TeamInput {
                name: name.to_string(),
                country: country.to_string(),
                captain_id: Some(captain.id),
            })
            .await?;
        summary.teams += 1;

        let mut playing = Vec::with_capacity(PLAYING_XI);
        for _ in 0..PLAYING_XI {
            playing.push(seeder.player(team.id, true).await?);
        }
        let bench = seeder.rng.gen_range(3..=7);
        for _ in 0..bench {
            seeder.player(team.id, false).await?;
        }
        summary.players += PLAYING_XI + bench;

        teams.push((team.id, playing));
    }
    info!(
        "Created {} teams with {} players",
        summary.teams, summary.players
    );

    let season_start = Utc::now().date_naive() - Duration::days(SEASON_DAYS);
    for i in 0..MATCHES {
        let picked: Vec<usize> = (0..teams.len())
            .collect::<Vec<_>>()
            .choose_multiple(&mut seeder.rng, 2)
            .copied()
            .collect();
        let (first, second) = (picked[0], picked[1]);
        let (team1_id, team2_id) = (teams[first].0, teams[second].0);

        let winner_id = match seeder.rng.gen_range(0..3) {
            0 => Some(team1_id),
            1 => Some(team2_id),
            _ => None,
        };
        let venue = *VENUES.choose(&mut seeder.rng).unwrap_or(&"Lord's");

        league
            .create_match(MatchInput {
                date: season_start + Duration::days(i * MATCH_SPACING_DAYS),
                venue: venue.to_string(),
                team1_id,
                team2_id,
                winner_id,
            })
            .await?;
        summary.matches += 1;

        seeder.score(&mut teams[first].1).await?;
        seeder.score(&mut teams[second].1).await?;
    }
    info!("Created {} matches", summary.matches);

    Ok(summary)
}
