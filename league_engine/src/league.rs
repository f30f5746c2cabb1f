//! Service facade sharing one store between all managers.

use std::sync::Arc;

use crate::db::LeagueStore;
use crate::errors::LeagueResult;
use crate::matches::MatchManager;
use crate::standings::StandingsManager;
use crate::team::TeamManager;
use crate::tournament::TournamentManager;

/// All league services over one store
#[derive(Clone)]
pub struct League {
    pub tournaments: TournamentManager,
    pub matches: MatchManager,
    pub standings: StandingsManager,
    pub teams: TeamManager,
    store: Arc<dyn LeagueStore>,
}

impl League {
    pub fn new<S: LeagueStore + 'static>(store: Arc<S>) -> Self {
        Self::from_store(store)
    }

    pub fn from_store(store: Arc<dyn LeagueStore>) -> Self {
        Self {
            tournaments: TournamentManager::new(store.clone()),
            matches: MatchManager::new(store.clone()),
            standings: StandingsManager::new(store.clone()),
            teams: TeamManager::new(store.clone()),
            store,
        }
    }

    /// Check that the underlying store is reachable
    pub async fn health_check(&self) -> LeagueResult<()> {
        self.store.health_check().await
    }
}
