//! Match resolution and event recording.

use std::sync::Arc;

use super::models::{Match, MatchEvent, MatchId, NewMatchEvent, Resolution, Score};
use crate::auth::AuthContext;
use crate::db::LeagueStore;
use crate::errors::{ErrorKind, LeagueError, LeagueResult};

/// Match manager
#[derive(Clone)]
pub struct MatchManager {
    store: Arc<dyn LeagueStore>,
}

impl MatchManager {
    pub fn new(store: Arc<dyn LeagueStore>) -> Self {
        Self { store }
    }

    /// Record a final score and advance the winner (admins only)
    ///
    /// A draw completes the match without advancing anyone. Resolving the
    /// final completes the tournament.
    ///
    /// # Errors
    ///
    /// - `InvalidScore` for a side outside `0..=MAX_SCORE`
    /// - `MatchNotFound`, `AlreadyResolved` (scores stay as they were)
    /// - `MatchNotReady` while a slot is still empty
    /// - `BracketInconsistency` when the winner's slot in the next match is
    ///   already taken
    pub async fn resolve_match(
        &self,
        ctx: &AuthContext,
        match_id: MatchId,
        score_a: i32,
        score_b: i32,
    ) -> LeagueResult<Resolution> {
        ctx.require_admin()?;
        let score = Score::new(score_a, score_b)?;

        let resolution = match self.store.resolve_match(match_id, score).await {
            Ok(resolution) => resolution,
            Err(e) if e.kind() == ErrorKind::Consistency => {
                log::error!("Resolving match {} hit a bracket fault: {}", match_id, e);
                return Err(e);
            }
            Err(e) => {
                log::warn!("Resolution of match {} rejected: {}", match_id, e);
                return Err(e);
            }
        };

        match (resolution.winner, resolution.advanced_to) {
            (Some(winner), Some((next_id, slot))) => log::info!(
                "Match {} resolved {}-{}: team {} advances to match {} as {}",
                match_id,
                score_a,
                score_b,
                winner,
                next_id,
                slot
            ),
            _ => log::info!("Match {} resolved {}-{}", match_id, score_a, score_b),
        }
        if resolution.tournament_completed {
            log::info!(
                "Tournament {} completed with its final (match {})",
                resolution.resolved.tournament_id,
                match_id
            );
        }

        Ok(resolution)
    }

    /// Append a goal or card event (captains only, for their own matches)
    ///
    /// The event, the match score and the player's counters are written
    /// together or not at all. The captain's team is checked against the
    /// match inside the same store call, so a concurrent bracket change
    /// cannot slip between the check and the write.
    ///
    /// # Errors
    ///
    /// - `Forbidden` for non-captains and for matches the team does not play
    /// - `MatchClosed` once the match is completed
    /// - `PlayerBanned`, `PlayerNotInMatch`, `InvalidMinute`
    pub async fn record_event(
        &self,
        ctx: &AuthContext,
        event: NewMatchEvent,
    ) -> LeagueResult<MatchEvent> {
        let team_id = ctx.require_captain()?;

        let recorded = self
            .store
            .record_event(event, team_id)
            .await
            .inspect_err(|e| {
                log::warn!("Event for match {} rejected: {}", event.match_id, e);
            })?;

        log::debug!(
            "Recorded {} by player {} at minute {} in match {}",
            recorded.kind.as_str(),
            recorded.player_id,
            recorded.minute,
            recorded.match_id
        );
        Ok(recorded)
    }

    pub async fn get_match(&self, match_id: MatchId) -> LeagueResult<Match> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or(LeagueError::MatchNotFound(match_id))
    }

    /// Events of a match in the order they were recorded
    pub async fn list_events(&self, match_id: MatchId) -> LeagueResult<Vec<MatchEvent>> {
        self.get_match(match_id).await?;
        self.store.list_events(match_id).await
    }
}
