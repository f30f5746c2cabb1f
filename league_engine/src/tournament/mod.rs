//! Single-elimination tournaments.
//!
//! A tournament moves through `registration -> active -> completed`. Building
//! the bracket activates it; resolving the final completes it.
//!
//! ## Example
//!
//! ```no_run
//! use league_engine::auth::AuthContext;
//! use league_engine::db::MemoryLeagueStore;
//! use league_engine::tournament::TournamentManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tournaments = TournamentManager::new(Arc::new(MemoryLeagueStore::new()));
//!     let admin = AuthContext::admin(1);
//!
//!     let cup = tournaments.create_tournament(&admin, "Spring Cup", 8).await?;
//!     println!("Created tournament: {}", cup.id);
//!
//!     Ok(())
//! }
//! ```

pub mod bracket;
pub mod manager;
pub mod models;

pub use bracket::{BracketPlan, PlannedMatch};
pub use manager::TournamentManager;
pub use models::{Tournament, TournamentId, TournamentRegistration, TournamentStatus};
