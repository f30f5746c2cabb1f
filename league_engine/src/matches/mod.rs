//! Matches: resolution, winner propagation and the event log.

pub mod manager;
pub mod models;

pub use manager::MatchManager;
pub use models::{
    EventKind, Match, MatchEvent, MatchId, MatchStatus, NewMatchEvent, Resolution, Score, Slot,
};
