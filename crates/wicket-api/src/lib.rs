pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use chrono::Duration;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sea_orm::DatabaseConnection;
use wicket_auth::{JwtValidator, TokenIssuer};
use wicket_core::League;

pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub league: League,
    pub tokens: TokenIssuer,
    pub validator: Arc<JwtValidator>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wicket API",
        version = "0.1.0",
        description = "REST API for running a cricket league: teams, rosters and match results"
    ),
    paths(
        handlers::health_check,
        handlers::auth::register,
        handlers::auth::obtain_token,
        handlers::auth::refresh_token,
        handlers::players::list_players,
        handlers::players::get_player,
        handlers::players::create_player,
        handlers::players::update_player,
        handlers::players::delete_player,
        handlers::teams::list_teams,
        handlers::teams::get_team,
        handlers::teams::create_team,
        handlers::teams::update_team,
        handlers::teams::delete_team,
        handlers::matches::list_matches,
        handlers::matches::get_match,
        handlers::matches::create_match,
        handlers::matches::update_match,
        handlers::matches::delete_match,
    ),
    components(
        schemas(
            models::EmptyData,
            models::ErrorResponse,
            models::HealthResponse,
            models::RegisterRequest,
            models::RegisteredUser,
            models::TokenRequest,
            models::TokenPairResponse,
            models::RefreshRequest,
            models::AccessTokenResponse,
            models::UserView,
            models::PlayerView,
            models::PlayerRequest,
            models::TeamView,
            models::TeamRequest,
            models::MatchView,
            models::MatchRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration and JWT token endpoints"),
        (name = "players", description = "Player profile endpoints"),
        (name = "teams", description = "Team and captaincy endpoints"),
        (name = "matches", description = "Match result endpoints"),
        (name = "system", description = "System health endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for local development origins
    pub enable_cors: bool,
    /// HS256 secret for signing tokens
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl ApiServerConfig {
    pub fn new(bind_addr: SocketAddr, jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr,
            enable_cors: true,
            jwt_secret: jwt_secret.into(),
            access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::hours(24),
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

type StateRouter = Router<Arc<AppState>>;

/// Register `path` with and without its trailing slash
fn route_both(router: StateRouter, path: &str, method: MethodRouter<Arc<AppState>>) -> StateRouter {
    let bare = path.trim_end_matches('/');
    router.route(bare, method.clone()).route(path, method)
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let tokens = TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.access_ttl,
            config.refresh_ttl,
        );
        let validator = Arc::new(tokens.validator());

        let state = Arc::new(AppState {
            league: League::new(db),
            tokens,
            validator,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        use handlers::{auth, matches, players, teams};

        let api_doc = ApiDoc::openapi();

        // PUBLIC routes
        let mut public_router = Router::new().route("/api/health", get(handlers::health_check));
        public_router = route_both(public_router, "/api/register/", post(auth::register));
        public_router = route_both(public_router, "/api/token/", post(auth::obtain_token));
        public_router = route_both(public_router, "/api/token/refresh/", post(auth::refresh_token));

        // PROTECTED routes (bearer access token)
        let mut protected_router = Router::new();
        protected_router = route_both(
            protected_router,
            "/api/players/",
            get(players::list_players).post(players::create_player),
        );
        protected_router = route_both(
            protected_router,
            "/api/players/{id}/",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        );
        protected_router = route_both(
            protected_router,
            "/api/teams/",
            get(teams::list_teams).post(teams::create_team),
        );
        protected_router = route_both(
            protected_router,
            "/api/teams/{id}/",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        );
        protected_router = route_both(
            protected_router,
            "/api/matches/",
            get(matches::list_matches).post(matches::create_match),
        );
        protected_router = route_both(
            protected_router,
            "/api/matches/{id}/",
            get(matches::get_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        );
        let protected_router = protected_router.layer(axum_middleware::from_fn_with_state(
            self.state.clone(),
            middleware::require_auth,
        ));

        let api_router = public_router
            .merge(protected_router)
            .with_state(self.state.clone());

        // SwaggerUi also serves /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router)
            .layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::log_requests,
            ));

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI document: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/matches/{id}/"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/token/refresh/"));
    }
}
