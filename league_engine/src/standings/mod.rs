//! League standings derived from completed matches.
//!
//! A standing is never a source of truth. Recomputing deletes every row of
//! the tournament and replays its completed matches, so the rows are always
//! reproducible from match history.

pub mod aggregator;
pub mod manager;
pub mod models;

pub use aggregator::{aggregate, rank};
pub use manager::StandingsManager;
pub use models::Standing;
