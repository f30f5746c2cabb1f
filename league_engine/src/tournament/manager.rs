//! Tournament lifecycle: creation, registration and bracket construction.

use std::sync::Arc;

use super::models::{Tournament, TournamentId, validate_capacity};
use crate::auth::AuthContext;
use crate::db::LeagueStore;
use crate::errors::{LeagueError, LeagueResult};
use crate::matches::models::Match;
use crate::team::models::{Team, TeamId, validate_name};

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    store: Arc<dyn LeagueStore>,
}

impl TournamentManager {
    /// Create a new tournament manager
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Create a tournament in registration state (admins only)
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` unless `capacity` is a power of two in 2..=256.
    pub async fn create_tournament(
        &self,
        ctx: &AuthContext,
        name: &str,
        capacity: u32,
    ) -> LeagueResult<Tournament> {
        ctx.require_admin()?;
        let name = validate_name(name)?;
        let capacity = validate_capacity(capacity)?;

        let tournament = self.store.create_tournament(&name, capacity).await?;
        log::info!(
            "Created tournament {} '{}' with capacity {}",
            tournament.id,
            tournament.name,
            capacity
        );
        Ok(tournament)
    }

    /// Register a team (admins only)
    pub async fn register_team(
        &self,
        ctx: &AuthContext,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<()> {
        ctx.require_admin()?;

        match self.store.register_team(tournament_id, team_id).await {
            Ok(_) => {
                log::info!("Team {} registered for tournament {}", team_id, tournament_id);
                Ok(())
            }
            Err(e) => {
                log::warn!(
                    "Registration of team {} for tournament {} rejected: {}",
                    team_id,
                    tournament_id,
                    e
                );
                Err(e)
            }
        }
    }

    /// Withdraw a team before the bracket is built (admins only)
    pub async fn unregister_team(
        &self,
        ctx: &AuthContext,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<()> {
        ctx.require_admin()?;

        self.store
            .unregister_team(tournament_id, team_id)
            .await
            .inspect_err(|e| {
                log::warn!(
                    "Withdrawal of team {} from tournament {} rejected: {}",
                    team_id,
                    tournament_id,
                    e
                );
            })?;
        log::info!("Team {} withdrawn from tournament {}", team_id, tournament_id);
        Ok(())
    }

    /// Build the single-elimination bracket and activate the tournament
    ///
    /// Returns the number of matches created, walkovers included. Nothing is
    /// written unless the whole bracket is.
    pub async fn build_bracket(
        &self,
        ctx: &AuthContext,
        tournament_id: TournamentId,
    ) -> LeagueResult<usize> {
        ctx.require_admin()?;

        let matches = match self.store.create_bracket(tournament_id).await {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Bracket build for tournament {} failed: {}", tournament_id, e);
                return Err(e);
            }
        };

        let walkovers = matches.iter().filter(|m| m.walkover).count();
        log::info!(
            "Built bracket for tournament {}: {} matches ({} walkovers)",
            tournament_id,
            matches.len(),
            walkovers
        );
        Ok(matches.len())
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> LeagueResult<Tournament> {
        self.store
            .find_tournament(tournament_id)
            .await?
            .ok_or(LeagueError::TournamentNotFound(tournament_id))
    }

    /// All tournaments, newest first
    pub async fn list_tournaments(&self) -> LeagueResult<Vec<Tournament>> {
        self.store.list_tournaments().await
    }

    /// Bracket matches ordered by round, then match number
    pub async fn list_matches(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>> {
        self.get_tournament(tournament_id).await?;
        self.store.list_matches(tournament_id).await
    }

    /// Registered teams in registration order
    pub async fn list_registered_teams(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<Team>> {
        let registrations = self.store.list_registrations(tournament_id).await?;

        let mut teams = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let team = self
                .store
                .find_team(registration.team_id)
                .await?
                .ok_or(LeagueError::TeamNotFound(registration.team_id))?;
            teams.push(team);
        }
        Ok(teams)
    }
}
