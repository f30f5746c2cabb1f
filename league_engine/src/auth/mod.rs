//! Caller identity and role checks.
//!
//! Every engine operation takes an [`AuthContext`] argument instead of looking
//! up a current user. The HTTP layer builds the context from a bearer token
//! with [`TokenVerifier`]; tests build it directly.
//!
//! - Admins build brackets, resolve matches and manage tournaments
//! - Captains record events for matches their own team plays in

pub mod models;
pub mod token;

pub use models::{AccessTokenClaims, AuthContext, Role, UserId};
pub use token::TokenVerifier;
