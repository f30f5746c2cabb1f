//! # League Engine
//!
//! Tournament bracket and standings engine for a football league backend.
//!
//! A tournament collects team registrations, then builds a single-elimination
//! bracket. Resolving a match records its score and moves the winner into the
//! next match; resolving the final completes the tournament. Standings are
//! derived from completed matches and rebuilt wholesale on demand.
//!
//! ## Core Modules
//!
//! - [`tournament`]: Lifecycle state machine and the [`BracketPlan`] builder
//! - [`matches`]: Match resolution, winner propagation and the event log
//! - [`standings`]: Standing aggregation and display ranking
//! - [`team`]: Teams and player rosters
//! - [`auth`]: Explicit caller context and access tokens
//! - [`db`]: Store traits with PostgreSQL and in-memory implementations
//!
//! ## Example
//!
//! ```
//! use league_engine::{League, auth::AuthContext, db::MemoryLeagueStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), league_engine::LeagueError> {
//! let league = League::new(Arc::new(MemoryLeagueStore::new()));
//! let admin = AuthContext::admin(1);
//!
//! let cup = league.tournaments.create_tournament(&admin, "Cup", 4).await?;
//! for (captain, name) in [(10, "Rovers"), (11, "United")] {
//!     let team = league.teams.create_team(&admin, name, None, captain).await?;
//!     league.tournaments.register_team(&admin, cup.id, team.id).await?;
//! }
//! assert_eq!(league.tournaments.build_bracket(&admin, cup.id).await?, 1);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod db;
pub mod errors;
pub mod league;
pub mod matches;
pub mod standings;
pub mod team;
pub mod tournament;

pub use errors::{ErrorKind, LeagueError, LeagueResult};
pub use league::League;
pub use tournament::BracketPlan;
