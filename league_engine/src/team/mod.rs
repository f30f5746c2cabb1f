//! Teams and their player rosters.

pub mod manager;
pub mod models;

pub use manager::TeamManager;
pub use models::{Player, PlayerId, Team, TeamDetails, TeamId};
