//! Team manager: teams and rosters.

use std::sync::Arc;

use super::models::{
    Player, PlayerId, Team, TeamDetails, TeamId, validate_jersey_number, validate_name,
};
use crate::auth::{AuthContext, UserId};
use crate::db::LeagueStore;
use crate::errors::{LeagueError, LeagueResult};

/// Team manager
#[derive(Clone)]
pub struct TeamManager {
    store: Arc<dyn LeagueStore>,
}

impl TeamManager {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Create a team led by `captain_id` (admins only)
    pub async fn create_team(
        &self,
        ctx: &AuthContext,
        name: &str,
        logo_url: Option<&str>,
        captain_id: UserId,
    ) -> LeagueResult<Team> {
        ctx.require_admin()?;
        let name = validate_name(name)?;

        let team = self.store.create_team(&name, logo_url, captain_id).await?;
        log::info!("Created team {} '{}' (captain {})", team.id, team.name, captain_id);
        Ok(team)
    }

    /// Add a player to a roster
    ///
    /// Captains may only add players to their own team; admins to any team.
    pub async fn add_player(
        &self,
        ctx: &AuthContext,
        team_id: TeamId,
        name: &str,
        jersey_number: i32,
    ) -> LeagueResult<Player> {
        ensure_manages(ctx, team_id)?;
        let name = validate_name(name)?;
        let jersey_number = validate_jersey_number(jersey_number)?;

        let player = self.store.add_player(team_id, &name, jersey_number).await?;
        log::debug!("Added player {} to team {}", player.id, team_id);
        Ok(player)
    }

    /// Rename a team and replace its logo (own team for captains)
    pub async fn update_team(
        &self,
        ctx: &AuthContext,
        team_id: TeamId,
        name: &str,
        logo_url: Option<&str>,
    ) -> LeagueResult<Team> {
        ensure_manages(ctx, team_id)?;
        let name = validate_name(name)?;

        let team = self.store.update_team(team_id, &name, logo_url).await?;
        log::info!("Updated team {} '{}'", team.id, team.name);
        Ok(team)
    }

    /// Drop a player from a roster (own team for captains)
    ///
    /// Fails with `PlayerHasEvents` once the player appears in a match event,
    /// so the event log never points at a missing player.
    pub async fn remove_player(
        &self,
        ctx: &AuthContext,
        team_id: TeamId,
        player_id: PlayerId,
    ) -> LeagueResult<()> {
        ensure_manages(ctx, team_id)?;

        self.store
            .remove_player(team_id, player_id)
            .await
            .inspect_err(|e| {
                log::warn!(
                    "Removal of player {} from team {} rejected: {}",
                    player_id,
                    team_id,
                    e
                );
            })?;
        log::debug!("Removed player {} from team {}", player_id, team_id);
        Ok(())
    }

    /// Ban or reinstate a player (admins only)
    ///
    /// Banned players keep their counters but cannot appear in new events.
    pub async fn set_player_banned(
        &self,
        ctx: &AuthContext,
        player_id: PlayerId,
        banned: bool,
    ) -> LeagueResult<Player> {
        ctx.require_admin()?;

        let player = self.store.set_player_banned(player_id, banned).await?;
        if banned {
            log::info!("Banned player {} (team {})", player.id, player.team_id);
        } else {
            log::info!("Lifted ban on player {} (team {})", player.id, player.team_id);
        }
        Ok(player)
    }

    /// Team with its roster
    pub async fn get_team(&self, team_id: TeamId) -> LeagueResult<TeamDetails> {
        let team = self
            .store
            .find_team(team_id)
            .await?
            .ok_or(LeagueError::TeamNotFound(team_id))?;
        let players = self.store.list_players(team_id).await?;

        Ok(TeamDetails { team, players })
    }

    pub async fn get_player(&self, player_id: PlayerId) -> LeagueResult<Player> {
        self.store
            .find_player(player_id)
            .await?
            .ok_or(LeagueError::PlayerNotFound(player_id))
    }
}

/// Admins manage every team, captains only their own
fn ensure_manages(ctx: &AuthContext, team_id: TeamId) -> LeagueResult<()> {
    if !ctx.is_admin() && ctx.require_captain()? != team_id {
        return Err(LeagueError::Forbidden("captains may only manage their own team"));
    }
    Ok(())
}
