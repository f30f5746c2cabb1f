//! Match, score and match event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{LeagueError, LeagueResult};
use crate::team::models::{PlayerId, TeamId};
use crate::tournament::models::TournamentId;

/// Match ID type
pub type MatchId = i64;

/// Match event ID type
pub type EventId = i64;

/// Latest minute an event may be logged at (extra time included)
pub const MAX_EVENT_MINUTE: i32 = 150;

/// Highest goal count accepted for one side of a final score
pub const MAX_SCORE: i32 = 99;

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    PendingVerification,
    Disputed,
    Completed,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::PendingVerification => "pending_verification",
            MatchStatus::Disputed => "disputed",
            MatchStatus::Completed => "completed",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "pending_verification" => Ok(MatchStatus::PendingVerification),
            "disputed" => Ok(MatchStatus::Disputed),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}

/// One of the two team positions of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::A => "a",
            Slot::B => "b",
        }
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" => Ok(Slot::A),
            "b" => Ok(Slot::B),
            other => Err(format!("unknown slot '{other}'")),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::A => write!(f, "TeamA"),
            Slot::B => write!(f, "TeamB"),
        }
    }
}

/// Final score pair, from TeamA's and TeamB's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub team_a: i32,
    pub team_b: i32,
}

impl Score {
    pub fn new(team_a: i32, team_b: i32) -> LeagueResult<Self> {
        let valid = 0..=MAX_SCORE;
        if !valid.contains(&team_a) || !valid.contains(&team_b) {
            return Err(LeagueError::InvalidScore {
                score_a: team_a,
                score_b: team_b,
            });
        }
        Ok(Self { team_a, team_b })
    }

    /// Slot of the side that scored more, `None` on a draw
    pub fn winning_slot(&self) -> Option<Slot> {
        match self.team_a.cmp(&self.team_b) {
            std::cmp::Ordering::Greater => Some(Slot::A),
            std::cmp::Ordering::Less => Some(Slot::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A bracket match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1 is the first round, the final has the highest round number
    pub round: i32,
    /// Position within the round, starting at 1
    pub match_number: i32,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    pub score_a: i32,
    pub score_b: i32,
    pub status: MatchStatus,
    /// Match the winner advances to, `None` for the final
    pub next_match_id: Option<MatchId>,
    /// Slot of the next match this match feeds
    pub next_slot: Option<Slot>,
    /// Completed at build time because no opponent was paired
    pub walkover: bool,
}

impl Match {
    pub fn is_final(&self) -> bool {
        self.next_match_id.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn team_in(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    /// Slot held by a team, if it plays in this match
    pub fn slot_of(&self, team_id: TeamId) -> Option<Slot> {
        if self.team_a == Some(team_id) {
            Some(Slot::A)
        } else if self.team_b == Some(team_id) {
            Some(Slot::B)
        } else {
            None
        }
    }

    pub fn score(&self) -> Score {
        Score {
            team_a: self.score_a,
            team_b: self.score_b,
        }
    }

    /// Winner of a completed match; draws and open matches have none
    pub fn winner(&self) -> Option<TeamId> {
        if !self.is_completed() {
            return None;
        }
        if self.walkover {
            return self.team_a.or(self.team_b);
        }
        self.score().winning_slot().and_then(|slot| self.team_in(slot))
    }

    /// Reject writes against a completed match
    pub fn ensure_open(&self) -> LeagueResult<()> {
        if self.is_completed() {
            return Err(LeagueError::MatchClosed(self.id));
        }
        Ok(())
    }

    /// Record the final score and mark the match completed
    ///
    /// Returns the winning team, or `None` on a draw.
    pub fn complete(&mut self, score: Score) -> LeagueResult<Option<TeamId>> {
        if self.is_completed() {
            return Err(LeagueError::AlreadyResolved(self.id));
        }
        if self.team_a.is_none() || self.team_b.is_none() {
            return Err(LeagueError::MatchNotReady(self.id));
        }

        self.score_a = score.team_a;
        self.score_b = score.team_b;
        self.status = MatchStatus::Completed;

        Ok(self.winner())
    }

    /// Place an advancing team into this match
    ///
    /// `preferred` is the slot the feeding match was wired to at build time.
    /// Without one, the first empty slot is taken, TeamA before TeamB.
    pub fn claim_slot(
        &mut self,
        team_id: TeamId,
        feeder: MatchId,
        preferred: Option<Slot>,
    ) -> LeagueResult<Slot> {
        let free = match preferred {
            Some(slot) => Some(slot).filter(|s| self.team_in(*s).is_none()),
            None if self.team_a.is_none() => Some(Slot::A),
            None if self.team_b.is_none() => Some(Slot::B),
            None => None,
        };
        let slot = free.ok_or(LeagueError::BracketInconsistency {
            match_id: feeder,
            parent_id: self.id,
        })?;

        match slot {
            Slot::A => self.team_a = Some(team_id),
            Slot::B => self.team_b = Some(team_id),
        }
        Ok(slot)
    }

    /// Apply a scoring event for the side the player belongs to
    pub fn apply_event(&mut self, side: Slot, kind: EventKind) {
        if kind == EventKind::Goal {
            match side {
                Slot::A => self.score_a = self.score_a.saturating_add(1),
                Slot::B => self.score_b = self.score_b.saturating_add(1),
            }
        }
    }
}

/// Kind of in-match action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "goal")]
    Goal,
    #[serde(rename = "card_yellow")]
    YellowCard,
    #[serde(rename = "card_red")]
    RedCard,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Goal => "goal",
            EventKind::YellowCard => "card_yellow",
            EventKind::RedCard => "card_red",
        }
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goal" => Ok(EventKind::Goal),
            "card_yellow" => Ok(EventKind::YellowCard),
            "card_red" => Ok(EventKind::RedCard),
            other => Err(format!("unknown event type '{other}'")),
        }
    }
}

/// Append-only log entry for an in-match action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: EventId,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub kind: EventKind,
    pub minute: i32,
    pub created_at: DateTime<Utc>,
}

/// Event to be appended to a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMatchEvent {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub kind: EventKind,
    pub minute: i32,
}

impl NewMatchEvent {
    pub fn validate(&self) -> LeagueResult<()> {
        if !(0..=MAX_EVENT_MINUTE).contains(&self.minute) {
            return Err(LeagueError::InvalidMinute(self.minute));
        }
        Ok(())
    }
}

/// Outcome of resolving a match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    /// The match after its score was recorded
    pub resolved: Match,
    /// Team that won, `None` on a draw
    pub winner: Option<TeamId>,
    /// Next match and slot the winner was placed in
    pub advanced_to: Option<(MatchId, Slot)>,
    /// Set when resolving the final completed the tournament
    pub tournament_completed: bool,
}
