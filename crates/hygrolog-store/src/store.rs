//! Main store implementation.

use std::path::{Path, PathBuf};

use time::Date;
use tracing::{debug, info};

use hygrolog_types::{DailyStats, Reading};

use crate::error::{Error, Result};
use crate::files;

/// File name of the bounded reading history.
pub const HISTORY_FILE: &str = "data.json";
/// File name of the daily statistics log.
pub const STATS_FILE: &str = "stats.json";

/// Default rolling-window history cap.
pub const DEFAULT_HISTORY_CAP: usize = 1000;
/// Default daily statistics cap (one year).
pub const DEFAULT_STATS_CAP: usize = 365;

/// How the persisted history is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the most recent `cap` readings, oldest evicted first. No
    /// day-boundary awareness.
    RollingWindow {
        /// Maximum number of retained readings.
        cap: usize,
    },
    /// Archive each day's readings into a [`DailyStats`] record at the first
    /// reading of a new day, then start the history over. The statistics log
    /// keeps at most `stats_cap` entries, oldest evicted first.
    DailyRotate {
        /// Maximum number of retained daily statistics records.
        stats_cap: usize,
    },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::RollingWindow {
            cap: DEFAULT_HISTORY_CAP,
        }
    }
}

/// Outcome of recording one reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordOutcome {
    /// The statistics record produced if this reading crossed a day boundary.
    pub rolled_over: Option<DailyStats>,
    /// Number of history entries on disk after the write.
    pub history_len: usize,
}

/// JSON-file store for hygrolog sensor readings.
///
/// Owns the data directory, the retention policy, and the rollover cursor
/// (the last calendar date the day-boundary check ran for). The store is the
/// single writer of both data files; the HTTP layer only ever reads them.
///
/// All reads go through the "missing or corrupt means empty" rule: the store
/// never fails to load, only to write.
pub struct Store {
    data_dir: PathBuf,
    policy: RetentionPolicy,
    last_rollover: Option<Date>,
}

impl Store {
    /// Open a store rooted at the given data directory, creating it if
    /// needed.
    pub fn open<P: AsRef<Path>>(data_dir: P, policy: RetentionPolicy) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|e| Error::CreateDirectory {
                path: data_dir.clone(),
                source: e,
            })?;
        }

        info!("Opening store at {} ({:?})", data_dir.display(), policy);

        Ok(Self {
            data_dir,
            policy,
            last_rollover: None,
        })
    }

    /// Open a store at the default platform data directory.
    pub fn open_default(policy: RetentionPolicy) -> Result<Self> {
        Self::open(crate::default_data_dir(), policy)
    }

    /// Path of the history file.
    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }

    /// Path of the daily statistics file.
    #[must_use]
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join(STATS_FILE)
    }

    /// The directory holding both data files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The configured retention policy.
    #[must_use]
    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Load the persisted history (missing/corrupt file yields empty).
    #[must_use]
    pub fn load_history(&self) -> Vec<Reading> {
        files::load_or_empty(&self.history_path())
    }

    /// Load the persisted statistics log (missing/corrupt file yields empty).
    #[must_use]
    pub fn load_stats(&self) -> Vec<DailyStats> {
        files::load_or_empty(&self.stats_path())
    }

    /// Record one reading according to the retention policy.
    ///
    /// Under [`RetentionPolicy::RollingWindow`] the reading is appended and
    /// the history truncated to the most recent `cap` entries.
    ///
    /// Under [`RetentionPolicy::DailyRotate`] the rollover check runs first:
    /// if the reading's date differs from the rollover cursor, the current
    /// history is archived as a [`DailyStats`] record (skipped when empty),
    /// the on-disk history is reset, and the cursor advances. The reading is
    /// then appended to the (possibly fresh) history.
    ///
    /// Both policies rewrite the affected files in full.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] only when a file cannot be written; load failures
    /// fall back to empty collections.
    pub fn record(&mut self, reading: &Reading) -> Result<RecordOutcome> {
        match self.policy {
            RetentionPolicy::RollingWindow { cap } => self.record_rolling(reading, cap),
            RetentionPolicy::DailyRotate { stats_cap } => self.record_daily(reading, stats_cap),
        }
    }

    fn record_rolling(&mut self, reading: &Reading, cap: usize) -> Result<RecordOutcome> {
        let mut history = self.load_history();
        history.push(*reading);
        truncate_oldest(&mut history, cap);
        files::save(&self.history_path(), &history)?;

        debug!("Recorded reading, history length {}", history.len());

        Ok(RecordOutcome {
            rolled_over: None,
            history_len: history.len(),
        })
    }

    fn record_daily(&mut self, reading: &Reading, stats_cap: usize) -> Result<RecordOutcome> {
        let mut history = self.load_history();
        let today = reading.date();

        // Seed the cursor on the first record after startup: a leftover
        // history file from a previous day must still be archived once the
        // first reading of a new day arrives.
        let cursor = *self
            .last_rollover
            .get_or_insert_with(|| history.last().map_or(today, Reading::date));

        let mut rolled_over = None;
        if cursor != today {
            if let Some(stats) = DailyStats::from_readings(cursor, &history) {
                let mut log = self.load_stats();
                // An interrupted rollover (statistics written, history reset
                // failed) leaves the day already archived; skip it on retry.
                if log.last().map(|s| s.date) != Some(cursor) {
                    log.push(stats);
                    truncate_oldest(&mut log, stats_cap);
                    files::save(&self.stats_path(), &log)?;

                    info!(
                        "Rolled {} readings of {} into daily statistics",
                        history.len(),
                        cursor
                    );
                }
                rolled_over = Some(stats);
            }

            history.clear();
        }

        history.push(*reading);
        files::save(&self.history_path(), &history)?;
        // Advance only once the reset history is on disk, so a failed write
        // re-runs the rollover check on the next record.
        self.last_rollover = Some(today);

        Ok(RecordOutcome {
            rolled_over,
            history_len: history.len(),
        })
    }
}

/// Drop the oldest entries until at most `cap` remain.
fn truncate_oldest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        items.drain(..items.len() - cap);
    }
}
