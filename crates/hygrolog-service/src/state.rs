//! Application state shared between the capture thread and the HTTP layer.
//!
//! The latest-reading snapshot is the only piece of state with two users:
//! the capture thread overwrites it once per tick and request handlers clone
//! it out. A `std::sync::RwLock` fits: the writer is a plain background
//! thread, the critical sections are a single copy, and handlers never hold
//! the lock across an await point.

use std::sync::{Arc, PoisonError, RwLock};

use time::OffsetDateTime;

use hygrolog_types::Reading;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The most recent successfully parsed reading, if any.
    latest: RwLock<Option<Reading>>,
    /// Service configuration (immutable after startup).
    pub config: Config,
    /// When the service started.
    started_at: OffsetDateTime,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            latest: RwLock::new(None),
            config,
            started_at: OffsetDateTime::now_utc(),
        })
    }

    /// The latest reading, or `None` before the first successful capture.
    pub fn latest(&self) -> Option<Reading> {
        *self
            .latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the latest reading. Called only by the capture thread.
    pub fn set_latest(&self, reading: Reading) {
        *self
            .latest
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(reading);
    }

    /// When the service started.
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }
}
