//! Single-elimination bracket planning.
//!
//! A plan is the full match tree for a roster, computed without touching the
//! store. Stores persist a plan inside one transaction together with the
//! tournament's move to `Active`.
//!
//! Layout for `k` registered teams:
//! - the bracket size `S` is the next power of two at or above `k`, giving
//!   `log2(S)` rounds and `S - 1` matches
//! - the first `k - S/2` first-round matches pair teams in registration order
//!   (1v2, 3v4, ...)
//! - every remaining first-round match holds a single team, which advances by
//!   walkover; those matches are complete before play starts
//! - match `n` of a round feeds match `ceil(n/2)` of the next round, odd
//!   numbers into TeamA and even numbers into TeamB

use serde::{Deserialize, Serialize};

use crate::errors::{LeagueError, LeagueResult};
use crate::matches::models::Slot;
use crate::team::models::TeamId;

/// Fewest teams a bracket can be built for
pub const MIN_TEAMS: usize = 2;

/// One match of a bracket plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMatch {
    pub round: i32,
    pub match_number: i32,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    /// Index into [`BracketPlan::matches`] of the match this one feeds
    pub parent: Option<usize>,
    pub parent_slot: Option<Slot>,
    pub walkover: bool,
}

/// Match tree for a roster
///
/// `matches` is ordered from the final down to the first round, so every
/// parent appears before the matches feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPlan {
    pub size: usize,
    pub rounds: u32,
    pub matches: Vec<PlannedMatch>,
}

impl BracketPlan {
    /// Plan a bracket for teams in registration order
    pub fn build(teams: &[TeamId], capacity: u32) -> LeagueResult<Self> {
        let count = teams.len();
        if count < MIN_TEAMS {
            return Err(LeagueError::InsufficientTeams {
                needed: MIN_TEAMS,
                current: count,
            });
        }

        let size = count.next_power_of_two();
        if size > capacity as usize {
            return Err(LeagueError::TournamentFull { capacity });
        }
        let rounds = size.trailing_zeros();

        let mut matches: Vec<PlannedMatch> = Vec::with_capacity(size - 1);
        // Index of the first match of the round built in the previous pass
        let mut parent_round_start = 0;

        for round in (1..=rounds).rev() {
            let round_start = matches.len();
            let in_round = size >> round;

            for number in 1..=in_round {
                let (parent, parent_slot) = if round == rounds {
                    (None, None)
                } else {
                    let parent = parent_round_start + (number - 1) / 2;
                    let slot = if number % 2 == 1 { Slot::A } else { Slot::B };
                    (Some(parent), Some(slot))
                };

                matches.push(PlannedMatch {
                    round: round as i32,
                    match_number: number as i32,
                    team_a: None,
                    team_b: None,
                    parent,
                    parent_slot,
                    walkover: false,
                });
            }

            parent_round_start = round_start;
        }

        // First round occupies the tail of the list
        let first_round = matches.len() - size / 2;
        let paired = count - size / 2;
        let mut roster = teams.iter().copied();

        for offset in 0..size / 2 {
            let idx = first_round + offset;
            matches[idx].team_a = roster.next();
            if offset < paired {
                matches[idx].team_b = roster.next();
            } else {
                matches[idx].walkover = true;
            }
        }

        // Walkover winners start in their next match
        for idx in first_round..matches.len() {
            if !matches[idx].walkover {
                continue;
            }
            let (Some(parent), Some(slot), Some(team)) = (
                matches[idx].parent,
                matches[idx].parent_slot,
                matches[idx].team_a,
            ) else {
                continue;
            };
            match slot {
                Slot::A => matches[parent].team_a = Some(team),
                Slot::B => matches[parent].team_b = Some(team),
            }
        }

        Ok(Self {
            size,
            rounds,
            matches,
        })
    }

    /// Number of matches in the plan
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of first-round walkovers
    pub fn walkovers(&self) -> usize {
        self.matches.iter().filter(|m| m.walkover).count()
    }
}
