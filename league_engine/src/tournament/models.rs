//! Tournament data models and lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{LeagueError, LeagueResult};
use crate::team::models::TeamId;

/// Tournament ID type
pub type TournamentId = i64;

/// Smallest bracket capacity
pub const MIN_CAPACITY: u32 = 2;

/// Largest bracket capacity
pub const MAX_CAPACITY: u32 = 256;

/// Capacity used when none is given
pub const DEFAULT_CAPACITY: u32 = 16;

/// Tournament lifecycle state
///
/// `Registration` → `Active` (bracket built) → `Completed` (final resolved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Teams may register; no bracket yet
    Registration,
    /// Bracket built; matches may be resolved
    Active,
    /// Final resolved
    Completed,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Registration => "registration",
            TournamentStatus::Active => "active",
            TournamentStatus::Completed => "completed",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: TournamentStatus) -> bool {
        matches!(
            (self, next),
            (TournamentStatus::Registration, TournamentStatus::Active)
                | (TournamentStatus::Active, TournamentStatus::Completed)
        )
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registration" => Ok(TournamentStatus::Registration),
            "active" => Ok(TournamentStatus::Active),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status '{other}'")),
        }
    }
}

/// Tournament model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Maximum number of teams, a power of two
    pub capacity: u32,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Check that teams may still register
    pub fn ensure_registration_open(&self, registered: usize) -> LeagueResult<()> {
        if self.status != TournamentStatus::Registration {
            return Err(LeagueError::RegistrationClosed(self.id));
        }
        if registered >= self.capacity as usize {
            return Err(LeagueError::TournamentFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Check that the bracket has not been built yet
    pub fn ensure_not_started(&self) -> LeagueResult<()> {
        if !self.status.can_transition_to(TournamentStatus::Active) {
            return Err(LeagueError::AlreadyActive {
                tournament_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Check that matches may be resolved
    pub fn ensure_active(&self) -> LeagueResult<()> {
        if !self.status.can_transition_to(TournamentStatus::Completed) {
            return Err(LeagueError::TournamentNotActive {
                tournament_id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Move to the next lifecycle status
    ///
    /// Every status write goes through here. Building a bracket is the only
    /// way into `Active` and resolving the final the only way into `Completed`.
    pub fn advance_to(&mut self, next: TournamentStatus) -> LeagueResult<()> {
        match next {
            TournamentStatus::Active => self.ensure_not_started()?,
            TournamentStatus::Completed => self.ensure_active()?,
            TournamentStatus::Registration => {
                return Err(LeagueError::AlreadyActive {
                    tournament_id: self.id,
                    status: self.status,
                });
            }
        }
        self.status = next;
        Ok(())
    }
}

/// Team registration entry, in registration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentRegistration {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub registered_at: DateTime<Utc>,
}

/// Validate a bracket capacity
pub fn validate_capacity(capacity: u32) -> LeagueResult<u32> {
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) || !capacity.is_power_of_two() {
        return Err(LeagueError::InvalidCapacity(capacity));
    }
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament(status: TournamentStatus, capacity: u32) -> Tournament {
        Tournament {
            id: 1,
            name: "Spring Cup".to_string(),
            capacity,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_capacity() {
        assert_eq!(validate_capacity(2).unwrap(), 2);
        assert_eq!(validate_capacity(16).unwrap(), 16);
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(1).is_err());
        assert!(validate_capacity(12).is_err());
        assert!(validate_capacity(512).is_err());
    }

    #[test]
    fn test_lifecycle_transitions() {
        use TournamentStatus::*;
        assert!(Registration.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Registration.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
        assert!(!Active.can_transition_to(Registration));
    }

    #[test]
    fn test_registration_closed_after_bracket() {
        let t = tournament(TournamentStatus::Active, 8);
        assert!(matches!(
            t.ensure_registration_open(2),
            Err(LeagueError::RegistrationClosed(1))
        ));
    }

    #[test]
    fn test_registration_full() {
        let t = tournament(TournamentStatus::Registration, 4);
        assert!(t.ensure_registration_open(3).is_ok());
        assert!(matches!(
            t.ensure_registration_open(4),
            Err(LeagueError::TournamentFull { capacity: 4 })
        ));
    }

    #[test]
    fn test_ensure_not_started() {
        assert!(
            tournament(TournamentStatus::Registration, 4)
                .ensure_not_started()
                .is_ok()
        );
        assert!(matches!(
            tournament(TournamentStatus::Completed, 4).ensure_not_started(),
            Err(LeagueError::AlreadyActive { .. })
        ));
    }

    #[test]
    fn test_advance_follows_lifecycle() {
        let mut t = tournament(TournamentStatus::Registration, 4);
        assert!(matches!(
            t.advance_to(TournamentStatus::Completed),
            Err(LeagueError::TournamentNotActive { .. })
        ));
        assert_eq!(t.status, TournamentStatus::Registration);

        t.advance_to(TournamentStatus::Active).unwrap();
        assert!(matches!(
            t.advance_to(TournamentStatus::Active),
            Err(LeagueError::AlreadyActive { .. })
        ));
        assert!(t.advance_to(TournamentStatus::Registration).is_err());

        t.advance_to(TournamentStatus::Completed).unwrap();
        assert_eq!(t.status, TournamentStatus::Completed);
        assert!(t.advance_to(TournamentStatus::Completed).is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "active".parse::<TournamentStatus>().unwrap(),
            TournamentStatus::Active
        );
        assert!("running".parse::<TournamentStatus>().is_err());
    }
}
