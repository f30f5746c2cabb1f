//! Team and roster API handlers.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use league_engine::{
    auth::{AuthContext, UserId},
    team::{Player, PlayerId, Team, TeamDetails, TeamId},
};
use serde::Deserialize;

use super::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub logo_url: Option<String>,
    pub captain_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: String,
    pub logo_url: Option<String>,
}

/// Ban toggle; an absent body bans the player
#[derive(Debug, Deserialize)]
pub struct BanRequest {
    #[serde(default = "default_banned")]
    pub is_banned: bool,
}

fn default_banned() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
    pub jersey_number: i32,
}

/// Team with its roster
pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<TeamId>,
) -> ApiResult<Json<TeamDetails>> {
    Ok(Json(state.league.teams.get_team(team_id).await?))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<Json<Player>> {
    Ok(Json(state.league.teams.get_player(player_id).await?))
}

/// Create a team (admin)
pub async fn create_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let team = state
        .league
        .teams
        .create_team(
            &ctx,
            &payload.name,
            payload.logo_url.as_deref(),
            payload.captain_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// The captain's own team
pub async fn my_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<TeamDetails>> {
    let team_id = ctx.require_captain()?;
    Ok(Json(state.league.teams.get_team(team_id).await?))
}

/// Add a player to the captain's own team
pub async fn add_player(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<AddPlayerRequest>,
) -> ApiResult<(StatusCode, Json<Player>)> {
    let team_id = ctx.require_captain()?;
    let player = state
        .league
        .teams
        .add_player(&ctx, team_id, &payload.name, payload.jersey_number)
        .await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Rename the captain's own team or change its logo
pub async fn update_my_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    let team_id = ctx.require_captain()?;
    let team = state
        .league
        .teams
        .update_team(&ctx, team_id, &payload.name, payload.logo_url.as_deref())
        .await?;
    Ok(Json(team))
}

/// Drop a player from the captain's own team
pub async fn remove_player(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<StatusCode> {
    let team_id = ctx.require_captain()?;
    state
        .league
        .teams
        .remove_player(&ctx, team_id, player_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ban or reinstate a player (admin)
pub async fn ban_player(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(player_id): Path<PlayerId>,
    payload: Option<Json<BanRequest>>,
) -> ApiResult<Json<Player>> {
    let banned = payload.is_none_or(|Json(body)| body.is_banned);
    let player = state
        .league
        .teams
        .set_player_banned(&ctx, player_id, banned)
        .await?;
    Ok(Json(player))
}
