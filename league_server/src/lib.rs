//! HTTP server for the league engine.
//!
//! Exposes bracket generation, match resolution, event recording and
//! standings behind role-gated axum routes.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
