//! Tournament API handlers.
//!
//! Create a tournament and seed its bracket:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/admin/tournaments \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Spring Cup", "capacity": 8}'
//!
//! curl -X POST http://localhost:8080/api/v1/admin/tournaments/1/generate \
//!   -H "Authorization: Bearer TOKEN"
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use league_engine::{
    auth::AuthContext,
    matches::Match,
    standings::Standing,
    team::{Team, TeamId},
    tournament::{Tournament, TournamentId},
};
use serde::{Deserialize, Serialize};

use super::{ApiResult, AppState, request_id::RequestId};

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub capacity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterTeamRequest {
    pub team_id: TeamId,
}

#[derive(Debug, Serialize)]
pub struct BracketResponse {
    pub tournament_id: TournamentId,
    pub matches_created: usize,
}

/// List all tournaments
pub async fn list_tournaments(State(state): State<AppState>) -> ApiResult<Json<Vec<Tournament>>> {
    Ok(Json(state.league.tournaments.list_tournaments().await?))
}

/// Get one tournament
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    Ok(Json(
        state.league.tournaments.get_tournament(tournament_id).await?,
    ))
}

/// Bracket matches in round, then match number order
pub async fn list_matches(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.league.tournaments.list_matches(tournament_id).await?))
}

/// Stored standings in display order
pub async fn get_standings(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Standing>>> {
    Ok(Json(state.league.standings.get_standings(tournament_id).await?))
}

/// Teams registered for a tournament
pub async fn list_teams(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Team>>> {
    Ok(Json(
        state
            .league
            .tournaments
            .list_registered_teams(tournament_id)
            .await?,
    ))
}

/// Create a tournament; capacity falls back to the configured default
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateTournamentRequest>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let capacity = payload.capacity.unwrap_or(state.default_capacity);
    let tournament = state
        .league
        .tournaments
        .create_tournament(&ctx, &payload.name, capacity)
        .await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Register a team for a tournament
pub async fn register_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(tournament_id): Path<TournamentId>,
    Json(payload): Json<RegisterTeamRequest>,
) -> ApiResult<StatusCode> {
    state
        .league
        .tournaments
        .register_team(&ctx, tournament_id, payload.team_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Withdraw a team while registration is open
pub async fn unregister_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path((tournament_id, team_id)): Path<(TournamentId, TeamId)>,
) -> ApiResult<StatusCode> {
    state
        .league
        .tournaments
        .unregister_team(&ctx, tournament_id, team_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Seed the bracket from the registered teams
pub async fn generate_bracket(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<(StatusCode, Json<BracketResponse>)> {
    let matches_created = state
        .league
        .tournaments
        .build_bracket(&ctx, tournament_id)
        .await?;

    crate::metrics::brackets_built_total(matches_created);
    tracing::info!(
        request_id = request_id.as_str(),
        tournament_id,
        matches_created,
        "Bracket generated"
    );

    Ok((
        StatusCode::CREATED,
        Json(BracketResponse {
            tournament_id,
            matches_created,
        }),
    ))
}

/// Rebuild standings from completed matches
pub async fn recompute_standings(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Standing>>> {
    let standings = state
        .league
        .standings
        .recompute_standings(&ctx, tournament_id)
        .await?;
    crate::metrics::standings_recomputed_total();
    Ok(Json(standings))
}
