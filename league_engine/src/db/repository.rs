//! Repository trait definitions for testability and dependency injection.
//!
//! Each multi-row mutation is a single trait method, and every implementation
//! runs it as one atomic unit: either all of its writes become visible or
//! none do. Implementations share the domain rules through the model methods
//! ([`Match::complete`], [`Match::claim_slot`], [`BracketPlan::build`],
//! [`aggregate`](crate::standings::aggregator::aggregate)) so that the
//! PostgreSQL store and the in-memory store cannot drift apart.
//!
//! [`Match::complete`]: crate::matches::models::Match::complete
//! [`Match::claim_slot`]: crate::matches::models::Match::claim_slot
//! [`BracketPlan::build`]: crate::tournament::bracket::BracketPlan::build

use async_trait::async_trait;

use crate::auth::UserId;
use crate::errors::LeagueResult;
use crate::matches::models::{Match, MatchEvent, MatchId, NewMatchEvent, Resolution, Score};
use crate::standings::models::Standing;
use crate::team::models::{Player, PlayerId, Team, TeamId};
use crate::tournament::models::{Tournament, TournamentId, TournamentRegistration};

/// Trait for team and roster operations
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Create a team led by a captain
    async fn create_team(
        &self,
        name: &str,
        logo_url: Option<&str>,
        captain_id: UserId,
    ) -> LeagueResult<Team>;

    /// Find team by ID
    async fn find_team(&self, team_id: TeamId) -> LeagueResult<Option<Team>>;

    /// Add a player to a team's roster
    async fn add_player(
        &self,
        team_id: TeamId,
        name: &str,
        jersey_number: i32,
    ) -> LeagueResult<Player>;

    /// Find player by ID
    async fn find_player(&self, player_id: PlayerId) -> LeagueResult<Option<Player>>;

    /// Players on a team, by ID
    async fn list_players(&self, team_id: TeamId) -> LeagueResult<Vec<Player>>;

    /// Rename a team and replace its logo
    async fn update_team(
        &self,
        team_id: TeamId,
        name: &str,
        logo_url: Option<&str>,
    ) -> LeagueResult<Team>;

    /// Remove a player from a team's roster
    ///
    /// Players referenced by a match event stay on the roster.
    async fn remove_player(&self, team_id: TeamId, player_id: PlayerId) -> LeagueResult<()>;

    /// Set or clear a player's ban
    async fn set_player_banned(&self, player_id: PlayerId, banned: bool)
    -> LeagueResult<Player>;
}

/// Trait for tournament lifecycle operations
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Create a tournament in registration state
    async fn create_tournament(&self, name: &str, capacity: u32) -> LeagueResult<Tournament>;

    /// Find tournament by ID
    async fn find_tournament(&self, tournament_id: TournamentId)
    -> LeagueResult<Option<Tournament>>;

    /// All tournaments, newest first
    async fn list_tournaments(&self) -> LeagueResult<Vec<Tournament>>;

    /// Register a team, checking status, capacity and duplicates atomically
    async fn register_team(
        &self,
        tournament_id: TournamentId,
        team_id: TeamId,
    ) -> LeagueResult<TournamentRegistration>;

    /// Withdraw a team while the tournament is still taking registrations
    async fn unregister_team(&self, tournament_id: TournamentId, team_id: TeamId)
    -> LeagueResult<()>;

    /// Registrations in registration order
    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> LeagueResult<Vec<TournamentRegistration>>;

    /// Build and persist the bracket for the registered teams and move the
    /// tournament to `Active`, all in one transaction
    ///
    /// Returns the created matches, final first.
    async fn create_bracket(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>>;
}

/// Trait for match operations
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Find match by ID
    async fn find_match(&self, match_id: MatchId) -> LeagueResult<Option<Match>>;

    /// Matches of a tournament ordered by round, then match number
    async fn list_matches(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Match>>;

    /// Record a final score, advance the winner into its next match and
    /// complete the tournament when the final is resolved
    ///
    /// The next match is re-read under lock before its slot is written.
    async fn resolve_match(&self, match_id: MatchId, score: Score) -> LeagueResult<Resolution>;

    /// Append an event and apply it to the match score and player counters
    ///
    /// `team_id` is the reporting captain's team; it must play in the match,
    /// checked under the same lock as the write.
    async fn record_event(&self, event: NewMatchEvent, team_id: TeamId)
    -> LeagueResult<MatchEvent>;

    /// Events of a match in insertion order
    async fn list_events(&self, match_id: MatchId) -> LeagueResult<Vec<MatchEvent>>;
}

/// Trait for standings operations
#[async_trait]
pub trait StandingRepository: Send + Sync {
    /// Delete and recreate every standing of a tournament from its completed
    /// matches, in one transaction
    ///
    /// Returns the stored rows ordered by team ID.
    async fn rebuild_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>>;

    /// Stored standings ordered by team ID
    async fn list_standings(&self, tournament_id: TournamentId) -> LeagueResult<Vec<Standing>>;
}

/// Complete store used by the league services
#[async_trait]
pub trait LeagueStore:
    TeamRepository + TournamentRepository + MatchRepository + StandingRepository
{
    /// Check that the store is reachable
    async fn health_check(&self) -> LeagueResult<()>;
}
