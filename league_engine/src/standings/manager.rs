//! Standings recomputation and reads.

use std::sync::Arc;

use super::aggregator::rank;
use super::models::Standing;
use crate::auth::AuthContext;
use crate::db::LeagueStore;
use crate::errors::{LeagueError, LeagueResult};
use crate::tournament::models::TournamentId;

/// Standings manager
#[derive(Clone)]
pub struct StandingsManager {
    store: Arc<dyn LeagueStore>,
}

impl StandingsManager {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Delete and rebuild a tournament's standings from its completed matches
    /// (admins only)
    ///
    /// Returns the rows in display order.
    pub async fn recompute_standings(
        &self,
        ctx: &AuthContext,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<Standing>> {
        ctx.require_admin()?;

        let mut standings = self.store.rebuild_standings(tournament_id).await?;
        rank(&mut standings);

        log::info!(
            "Recomputed standings for tournament {}: {} teams",
            tournament_id,
            standings.len()
        );
        Ok(standings)
    }

    /// Stored standings in display order
    pub async fn get_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>> {
        if self.store.find_tournament(tournament_id).await?.is_none() {
            return Err(LeagueError::TournamentNotFound(tournament_id));
        }

        let mut standings = self.store.list_standings(tournament_id).await?;
        rank(&mut standings);
        Ok(standings)
    }
}
