//! Wicket - cricket league service
//!
//! Serves the league REST API, applies database migrations, or seeds a
//! database with a demo league.

mod populate;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wicket_api::{ApiServer, ApiServerConfig};

/// Wicket - teams, rosters and match results for a cricket league
#[derive(Parser, Debug)]
#[command(name = "wicket")]
#[command(about = "Wicket - teams, rosters and match results for a cricket league")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug)]
struct Config {
    /// Address to bind the API server
    #[arg(long, env = "WICKET_BIND_ADDR", default_value = "127.0.0.1:8000", global = true)]
    bind_addr: SocketAddr,

    /// Database URL (postgres://... or sqlite://...)
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://wicket.db?mode=rwc",
        global = true
    )]
    database_url: String,

    /// Secret used to sign access and refresh tokens
    #[arg(long, env = "WICKET_JWT_SECRET", global = true, hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, default_value = "60", global = true)]
    access_token_minutes: i64,

    /// Refresh token lifetime in hours
    #[arg(long, default_value = "24", global = true)]
    refresh_token_hours: i64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Disable CORS for local development origins
    #[arg(long, global = true)]
    no_cors: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run migrations and serve the REST API
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Seed the database with a demo league
    Populate {
        /// RNG seed for a reproducible league
        #[arg(long)]
        seed: Option<u64>,

        /// Password for the `admin` user
        #[arg(long, default_value = "adminpassword")]
        admin_password: String,

        /// Password shared by every other seeded user
        #[arg(long, default_value = "password123")]
        user_password: String,
    },
}

/// Setup logging: RUST_LOG if set, otherwise the given level
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config;

    init_logging(&config.log_level);

    let db = wicket_db::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to connect to database {}", config.database_url))?;
    wicket_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let jwt_secret = config
                .jwt_secret
                .context("--jwt-secret (or WICKET_JWT_SECRET) is required to serve")?;

            let api_config = ApiServerConfig {
                bind_addr: config.bind_addr,
                enable_cors: !config.no_cors,
                jwt_secret,
                access_ttl: Duration::minutes(config.access_token_minutes),
                refresh_ttl: Duration::hours(config.refresh_token_hours),
            };

            info!("Wicket starting...");
            ApiServer::new(api_config, db).start().await?;
        }
        Commands::Migrate => {
            info!("Database is up to date");
        }
        Commands::Populate {
            seed,
            admin_password,
            user_password,
        } => {
            let league = wicket_core::League::new(db);
            let summary = populate::run(
                &league,
                populate::Options {
                    seed,
                    admin_password,
                    user_password,
                },
            )
            .await
            .context("Failed to populate the database")?;

            info!(
                "Populated league: {} teams, {} organisers, {} captains, {} players, {} matches",
                summary.teams, summary.organisers, summary.captains, summary.players, summary.matches
            );
        }
    }

    Ok(())
}
