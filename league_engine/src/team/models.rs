//! Team and player data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::errors::{LeagueError, LeagueResult};
use crate::matches::models::EventKind;

/// Team ID type
pub type TeamId = i64;

/// Player ID type
pub type PlayerId = i64;

/// Longest accepted team or player name
pub const MAX_NAME_LEN: usize = 64;

/// Team model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
    pub captain_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Player model
///
/// `goals_scored` and `red_cards` only move when a match event is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    pub name: String,
    pub jersey_number: i32,
    pub goals_scored: i32,
    pub red_cards: i32,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Bump the cumulative counter an event affects
    pub fn apply_event(&mut self, kind: EventKind) {
        match kind {
            EventKind::Goal => self.goals_scored += 1,
            EventKind::RedCard => self.red_cards += 1,
            EventKind::YellowCard => {}
        }
    }
}

/// Team with its roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDetails {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
}

/// Highest jersey number a player may wear
pub const MAX_JERSEY_NUMBER: i32 = 99;

/// Check a jersey number
pub fn validate_jersey_number(number: i32) -> LeagueResult<i32> {
    if !(0..=MAX_JERSEY_NUMBER).contains(&number) {
        return Err(LeagueError::InvalidJerseyNumber(number));
    }
    Ok(number)
}

/// Trim and check a display name
pub fn validate_name(name: &str) -> LeagueResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeagueError::InvalidName("name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(LeagueError::InvalidName(format!(
            "name longer than {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
