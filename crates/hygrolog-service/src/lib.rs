//! Capture loop and HTTP read API for the hygrolog sensor logger.
//!
//! The service runs exactly two concurrent units: the capture loop on a
//! dedicated background thread (serial read → parse → snapshot → persist →
//! optional git publish) and the axum server on the main runtime, which only
//! reads the snapshot and serves the persisted files.

pub mod api;
pub mod collector;
pub mod config;
pub mod state;

pub use collector::{Collector, TickOutcome};
pub use config::{Config, ConfigError, Retention};
pub use state::AppState;
