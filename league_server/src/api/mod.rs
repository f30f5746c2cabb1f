//! HTTP API for the league server.
//!
//! Handlers are thin: they decode the request, hand the caller's
//! [`AuthContext`](league_engine::auth::AuthContext) to the engine and map
//! [`LeagueError`] to a status code. Role checks live in the engine; the
//! router only decides which routes need a bearer token at all.
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `GET /api/v1/tournaments` - List tournaments
//! - `GET /api/v1/tournaments/{id}` - Tournament details
//! - `GET /api/v1/tournaments/{id}/matches` - Bracket in round order
//! - `GET /api/v1/tournaments/{id}/standings` - Ranked standings
//! - `GET /api/v1/tournaments/{id}/teams` - Registered teams
//! - `GET /api/v1/teams/{id}` - Team with roster
//! - `GET /api/v1/players/{id}` - Player
//! - `GET /api/v1/matches/{id}` - Match
//! - `GET /api/v1/matches/{id}/events` - Match event log
//!
//! ## Admin (bearer token, admin role)
//! - `POST /api/v1/admin/teams`
//! - `POST /api/v1/admin/tournaments`
//! - `POST /api/v1/admin/tournaments/{id}/teams`
//! - `DELETE /api/v1/admin/tournaments/{id}/teams/{team_id}` - Withdraw before the bracket
//! - `POST /api/v1/admin/tournaments/{id}/generate`
//! - `POST /api/v1/admin/tournaments/{id}/standings/recompute`
//! - `POST /api/v1/admin/matches/{id}/resolve`
//! - `POST /api/v1/admin/players/{id}/ban` - Body `{"is_banned": bool}`, bans when omitted
//!
//! ## Mobile (bearer token, captain role)
//! - `GET /api/v1/mobile/my-team`
//! - `PUT /api/v1/mobile/my-team` - Rename, change logo
//! - `POST /api/v1/mobile/my-team/players`
//! - `DELETE /api/v1/mobile/my-team/players/{id}`
//! - `POST /api/v1/mobile/matches/{id}/events`
//!
//! ## Health Check
//! - `GET /health`

pub mod matches;
pub mod middleware;
pub mod request_id;
pub mod teams;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use league_engine::{ErrorKind, League, LeagueError, auth::TokenVerifier};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; the league and verifier are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub league: League,
    pub tokens: Arc<TokenVerifier>,
    /// Capacity used when a create request omits one
    pub default_capacity: u32,
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Engine error carried out of a handler
#[derive(Debug)]
pub struct ApiError(pub LeagueError);

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        Self(err)
    }
}

/// Status code for an engine error class
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Consistency | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        match kind {
            ErrorKind::Consistency => {
                crate::metrics::bracket_faults_total();
                crate::logging::log_consistency_fault("request", &self.0.to_string());
            }
            ErrorKind::Internal => tracing::error!(error = %self.0, "Request failed"),
            _ => tracing::debug!(error = %self.0, "Request rejected"),
        }

        let body = ErrorResponse {
            error: self.0.client_message(),
        };
        (status_for(kind), Json(body)).into_response()
    }
}

/// Handler result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use league_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{tournament_id}/matches",
            get(tournaments::list_matches),
        )
        .route(
            "/tournaments/{tournament_id}/standings",
            get(tournaments::get_standings),
        )
        .route(
            "/tournaments/{tournament_id}/teams",
            get(tournaments::list_teams),
        )
        .route("/teams/{team_id}", get(teams::get_team))
        .route("/players/{player_id}", get(teams::get_player))
        .route("/matches/{match_id}", get(matches::get_match))
        .route("/matches/{match_id}/events", get(matches::list_events));

    let admin_routes = Router::new()
        .route("/teams", post(teams::create_team))
        .route("/tournaments", post(tournaments::create_tournament))
        .route(
            "/tournaments/{tournament_id}/teams",
            post(tournaments::register_team),
        )
        .route(
            "/tournaments/{tournament_id}/teams/{team_id}",
            delete(tournaments::unregister_team),
        )
        .route(
            "/tournaments/{tournament_id}/generate",
            post(tournaments::generate_bracket),
        )
        .route(
            "/tournaments/{tournament_id}/standings/recompute",
            post(tournaments::recompute_standings),
        )
        .route("/matches/{match_id}/resolve", post(matches::resolve_match))
        .route("/players/{player_id}/ban", post(teams::ban_player))
        .layer(axum::middleware::from_fn(middleware::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mobile_routes = Router::new()
        .route("/my-team", get(teams::my_team).put(teams::update_my_team))
        .route("/my-team/players", post(teams::add_player))
        .route("/my-team/players/{player_id}", delete(teams::remove_player))
        .route("/matches/{match_id}/events", post(matches::record_event))
        .layer(axum::middleware::from_fn(middleware::require_captain))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/admin", admin_routes)
        .nest("/mobile", mobile_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2026-10-18T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.league.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
