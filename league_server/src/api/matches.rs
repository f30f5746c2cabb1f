//! Match API handlers.
//!
//! Resolve a match (admin):
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/admin/matches/3/resolve \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"score_a": 2, "score_b": 1}'
//! ```
//!
//! Record a goal (captain):
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/mobile/matches/3/events \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"player_id": 12, "type": "goal", "minute": 57}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use league_engine::{
    auth::AuthContext,
    matches::{EventKind, Match, MatchEvent, MatchId, NewMatchEvent, Resolution},
    team::PlayerId,
};
use serde::Deserialize;

use super::{ApiResult, AppState, request_id::RequestId};

#[derive(Debug, Deserialize)]
pub struct ResolveMatchRequest {
    pub score_a: i32,
    pub score_b: i32,
}

#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    pub player_id: PlayerId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub minute: i32,
}

/// Get one match
pub async fn get_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.league.matches.get_match(match_id).await?))
}

/// Event log of a match, oldest first
pub async fn list_events(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Vec<MatchEvent>>> {
    Ok(Json(state.league.matches.list_events(match_id).await?))
}

/// Record the final score and advance the winner
pub async fn resolve_match(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    request_id: RequestId,
    Path(match_id): Path<MatchId>,
    Json(payload): Json<ResolveMatchRequest>,
) -> ApiResult<Json<Resolution>> {
    let resolution = state
        .league
        .matches
        .resolve_match(&ctx, match_id, payload.score_a, payload.score_b)
        .await?;

    crate::metrics::matches_resolved_total(resolution.advanced_to.is_some());
    if resolution.tournament_completed {
        crate::metrics::tournaments_completed_total();
        tracing::info!(
            request_id = request_id.as_str(),
            tournament_id = resolution.resolved.tournament_id,
            "Tournament completed"
        );
    }

    Ok(Json(resolution))
}

/// Append an event for a match the captain's team plays in
pub async fn record_event(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(match_id): Path<MatchId>,
    Json(payload): Json<RecordEventRequest>,
) -> ApiResult<(StatusCode, Json<MatchEvent>)> {
    let event = state
        .league
        .matches
        .record_event(
            &ctx,
            NewMatchEvent {
                match_id,
                player_id: payload.player_id,
                kind: payload.kind,
                minute: payload.minute,
            },
        )
        .await?;

    crate::metrics::match_events_recorded_total(event.kind.as_str());
    Ok((StatusCode::CREATED, Json(event)))
}
