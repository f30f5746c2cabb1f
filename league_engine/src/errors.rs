//! League engine error types.

use std::time::Duration;
use thiserror::Error;

use crate::matches::models::MatchId;
use crate::team::models::{PlayerId, TeamId};
use crate::tournament::models::{TournamentId, TournamentStatus};

/// Broad failure classes surfaced to callers.
///
/// No engine operation retries on its own; the kind tells the caller how to
/// present the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Referenced entity is absent
    NotFound,
    /// Operation is not legal in the current lifecycle state
    InvalidState,
    /// Malformed input
    Validation,
    /// Caller identity could not be established
    Unauthorized,
    /// Caller lacks the role or scope for the operation
    Forbidden,
    /// Bracket topology fault requiring operator attention
    Consistency,
    /// Store failure
    Internal,
}

/// League engine errors
#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Team not found: {0}")]
    TeamNotFound(TeamId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Tournament {tournament_id} already has a bracket (status {status:?})")]
    AlreadyActive {
        tournament_id: TournamentId,
        status: TournamentStatus,
    },

    #[error("Match {0} is already resolved")]
    AlreadyResolved(MatchId),

    #[error("Match {0} is closed for events")]
    MatchClosed(MatchId),

    #[error("Match {0} does not have both teams assigned yet")]
    MatchNotReady(MatchId),

    #[error("Tournament {tournament_id} is not active (status {status:?})")]
    TournamentNotActive {
        tournament_id: TournamentId,
        status: TournamentStatus,
    },

    #[error("Registration is closed for tournament {0}")]
    RegistrationClosed(TournamentId),

    #[error("Tournament is full: capacity {capacity}")]
    TournamentFull { capacity: u32 },

    #[error("Team {team_id} is already registered for tournament {tournament_id}")]
    AlreadyRegistered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    #[error("Insufficient teams: need {needed}, have {current}")]
    InsufficientTeams { needed: usize, current: usize },

    #[error("Invalid capacity {0}: must be a power of two between 2 and 256")]
    InvalidCapacity(u32),

    #[error("Invalid score {score_a}-{score_b}: each side must be between 0 and 99")]
    InvalidScore { score_a: i32, score_b: i32 },

    #[error("Invalid event minute: {0}")]
    InvalidMinute(i32),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid jersey number {0}: must be between 0 and 99")]
    InvalidJerseyNumber(i32),

    #[error("Team {team_id} is not registered for tournament {tournament_id}")]
    NotRegistered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },

    #[error("Player {0} is banned")]
    PlayerBanned(PlayerId),

    #[error("Player {0} has recorded match events and cannot be removed")]
    PlayerHasEvents(PlayerId),

    #[error("Player {player_id} does not play for either team in match {match_id}")]
    PlayerNotInMatch {
        player_id: PlayerId,
        match_id: MatchId,
    },

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Bracket inconsistency: match {match_id} cannot claim a slot in match {parent_id}")]
    BracketInconsistency { match_id: MatchId, parent_id: MatchId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

impl LeagueError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeagueError::TournamentNotFound(_)
            | LeagueError::MatchNotFound(_)
            | LeagueError::TeamNotFound(_)
            | LeagueError::PlayerNotFound(_)
            | LeagueError::NotRegistered { .. } => ErrorKind::NotFound,

            LeagueError::AlreadyActive { .. }
            | LeagueError::AlreadyResolved(_)
            | LeagueError::MatchClosed(_)
            | LeagueError::MatchNotReady(_)
            | LeagueError::TournamentNotActive { .. }
            | LeagueError::RegistrationClosed(_)
            | LeagueError::TournamentFull { .. }
            | LeagueError::AlreadyRegistered { .. }
            | LeagueError::InsufficientTeams { .. }
            | LeagueError::PlayerBanned(_)
            | LeagueError::PlayerHasEvents(_) => ErrorKind::InvalidState,

            LeagueError::InvalidCapacity(_)
            | LeagueError::InvalidScore { .. }
            | LeagueError::InvalidMinute(_)
            | LeagueError::InvalidName(_)
            | LeagueError::InvalidJerseyNumber(_)
            | LeagueError::PlayerNotInMatch { .. } => ErrorKind::Validation,

            LeagueError::InvalidToken(_) => ErrorKind::Unauthorized,
            LeagueError::Forbidden(_) => ErrorKind::Forbidden,
            LeagueError::BracketInconsistency { .. } => ErrorKind::Consistency,
            LeagueError::Database(_) | LeagueError::Timeout(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak internal details
    ///
    /// Database and token errors are sanitized; consistency faults are reported
    /// without topology details since only an operator can act on them.
    pub fn client_message(&self) -> String {
        match self {
            LeagueError::Database(_) | LeagueError::Timeout(_) => {
                "Internal server error".to_string()
            }
            LeagueError::InvalidToken(_) => "Authentication failed".to_string(),
            LeagueError::BracketInconsistency { .. } => {
                "Bracket is in an inconsistent state".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for league operations
pub type LeagueResult<T> = Result<T, LeagueError>;
