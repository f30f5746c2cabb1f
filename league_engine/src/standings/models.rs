//! Standing model.

use serde::{Deserialize, Serialize};

use crate::team::models::TeamId;
use crate::tournament::models::TournamentId;

/// Points for a win
pub const WIN_POINTS: i32 = 3;

/// Points for a draw
pub const DRAW_POINTS: i32 = 1;

/// Per-team tournament summary, rebuilt from completed matches
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Standing {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub points: i32,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    pub goals_for: i32,
    pub goals_against: i32,
}

impl Standing {
    pub fn new(tournament_id: TournamentId, team_id: TeamId) -> Self {
        Self {
            tournament_id,
            team_id,
            points: 0,
            wins: 0,
            losses: 0,
            draws: 0,
            goals_for: 0,
            goals_against: 0,
        }
    }

    pub fn goal_difference(&self) -> i32 {
        self.goals_for.saturating_sub(self.goals_against)
    }

    pub fn played(&self) -> i32 {
        self.wins.saturating_add(self.draws).saturating_add(self.losses)
    }

    /// Fold one played match in from this team's side
    pub fn record(&mut self, scored: i32, conceded: i32) {
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);

        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins = self.wins.saturating_add(1);
                self.points = self.points.saturating_add(WIN_POINTS);
            }
            std::cmp::Ordering::Equal => {
                self.draws = self.draws.saturating_add(1);
                self.points = self.points.saturating_add(DRAW_POINTS);
            }
            std::cmp::Ordering::Less => self.losses = self.losses.saturating_add(1),
        }
    }
}
