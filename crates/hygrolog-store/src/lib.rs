//! JSON-file persistence for hygrolog sensor readings.
//!
//! This crate owns the two flat data files of the logger:
//!
//! - `data.json`, the bounded reading history (most-recent last)
//! - `stats.json`, the daily statistics log (at most one year)
//!
//! and the retention policies that bound them: a rolling window of the most
//! recent readings, or a daily rotation that archives each finished day into
//! a statistics record.
//!
//! Missing or corrupt files load as empty collections; only writes can fail.
//!
//! # Example
//!
//! ```no_run
//! use hygrolog_store::{RetentionPolicy, Store};
//! use hygrolog_types::Reading;
//! use time::macros::datetime;
//!
//! let mut store = Store::open_default(RetentionPolicy::default())?;
//! let reading = Reading::new(datetime!(2024-03-01 08:00:00), 21.5, 54.0);
//! store.record(&reading)?;
//! # Ok::<(), hygrolog_store::Error>(())
//! ```

mod error;
mod files;
mod store;

pub use error::{Error, Result};
pub use store::{
    DEFAULT_HISTORY_CAP, DEFAULT_STATS_CAP, HISTORY_FILE, RecordOutcome, RetentionPolicy, STATS_FILE,
    Store,
};

/// Default data directory following platform conventions.
///
/// - Linux: `~/.local/share/hygrolog`
/// - macOS: `~/Library/Application Support/hygrolog`
/// - Windows: `C:\Users\<user>\AppData\Local\hygrolog`
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("hygrolog")
}
