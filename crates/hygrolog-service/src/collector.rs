//! Background capture loop.
//!
//! One dedicated thread owns the serial source, the store, and the optional
//! publisher; the HTTP runtime never touches any of them. Each tick performs
//! read → parse → snapshot → record → publish, folds the per-stage results
//! into a single [`TickOutcome`], logs it uniformly, and sleeps. Nothing a
//! tick does can terminate the loop.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use hygrolog_core::{LineSource, PublishOutcome, Publisher, now_civil};
use hygrolog_store::Store;
use hygrolog_types::{ParseError, Reading};

use crate::state::AppState;

/// Result of one capture tick.
///
/// Every stage failure is folded in here instead of being raised: the loop
/// treats all of them as "log and wait for the next tick".
#[derive(Debug)]
pub enum TickOutcome {
    /// A reading was parsed, snapshotted, and persisted.
    Recorded {
        reading: Reading,
        history_len: usize,
        rolled_over: bool,
    },
    /// Nothing arrived within the read timeout.
    NoData,
    /// The serial read itself failed.
    ReadFailed(hygrolog_core::Error),
    /// The line did not parse; it was discarded.
    ParseFailed(ParseError),
    /// The reading could not be persisted (snapshot was still updated).
    StoreFailed(hygrolog_store::Error),
    /// No device was available at startup; the loop only sleeps.
    Idle,
}

/// Background collector that captures one reading per tick.
pub struct Collector {
    state: Arc<AppState>,
    store: Store,
    source: Option<Box<dyn LineSource>>,
    publisher: Option<Box<dyn Publisher>>,
    interval: Duration,
}

impl Collector {
    /// Create a new collector.
    ///
    /// `source` is `None` when the serial device could not be opened at
    /// startup; the loop then degrades to sleeping without reading.
    pub fn new(
        state: Arc<AppState>,
        store: Store,
        source: Option<Box<dyn LineSource>>,
        publisher: Option<Box<dyn Publisher>>,
        interval: Duration,
    ) -> Self {
        Self {
            state,
            store,
            source,
            publisher,
            interval,
        }
    }

    /// Start the capture loop on a dedicated background thread.
    ///
    /// Returns immediately; the loop runs until process termination.
    pub fn start(mut self) -> std::io::Result<JoinHandle<()>> {
        info!(
            "Starting capture loop (interval {}s, device {})",
            self.interval.as_secs(),
            if self.source.is_some() {
                "connected"
            } else {
                "unavailable"
            }
        );

        std::thread::Builder::new()
            .name("hygrolog-capture".to_string())
            .spawn(move || {
                loop {
                    let outcome = self.tick();
                    log_outcome(&outcome);
                    std::thread::sleep(self.interval);
                }
            })
    }

    /// Run one capture-parse-persist cycle.
    fn tick(&mut self) -> TickOutcome {
        let Some(source) = self.source.as_mut() else {
            return TickOutcome::Idle;
        };

        let line = match source.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => return TickOutcome::NoData,
            Err(e) => return TickOutcome::ReadFailed(e),
        };
        debug!("Serial raw: {line:?}");

        let reading = match Reading::parse_line(&line, now_civil()) {
            Ok(reading) => reading,
            Err(e) => return TickOutcome::ParseFailed(e),
        };

        self.state.set_latest(reading);

        let outcome = match self.store.record(&reading) {
            Ok(outcome) => outcome,
            Err(e) => return TickOutcome::StoreFailed(e),
        };

        self.run_publish();

        TickOutcome::Recorded {
            reading,
            history_len: outcome.history_len,
            rolled_over: outcome.rolled_over.is_some(),
        }
    }

    /// Publish the data files; all outcomes are non-fatal and never retried
    /// within the same tick.
    fn run_publish(&self) {
        let Some(publisher) = &self.publisher else {
            return;
        };

        let paths = vec![self.store.history_path(), self.store.stats_path()];
        match publisher.publish(&paths) {
            Ok(PublishOutcome::Published) => debug!("Data files published"),
            Ok(PublishOutcome::NoChanges) => debug!("Publish skipped, no changes"),
            Err(e) => warn!("Publish failed: {e}, continuing"),
        }
    }
}

fn log_outcome(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Recorded {
            reading,
            history_len,
            rolled_over,
        } => {
            info!(
                "Recorded {:.2}°C {:.2}% (history length {}{})",
                reading.temperature,
                reading.humidity,
                history_len,
                if *rolled_over { ", rolled over" } else { "" }
            );
        }
        TickOutcome::NoData => debug!("No data this tick"),
        TickOutcome::ReadFailed(e) => warn!("Serial read failed: {e}"),
        TickOutcome::ParseFailed(e) => warn!("Discarded malformed line: {e}"),
        TickOutcome::StoreFailed(e) => warn!("Failed to persist reading: {e}"),
        TickOutcome::Idle => debug!("No device, idle tick"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use hygrolog_core::{MockLineSource, PublishError};
    use hygrolog_store::RetentionPolicy;

    use crate::config::Config;

    fn collector_with(
        dir: &std::path::Path,
        cap: usize,
        source: MockLineSource,
    ) -> (Collector, Arc<AppState>) {
        let state = AppState::new(Config::default());
        let store = Store::open(dir, RetentionPolicy::RollingWindow { cap }).unwrap();
        let collector = Collector::new(
            Arc::clone(&state),
            store,
            Some(Box::new(source)),
            None,
            Duration::from_secs(1800),
        );
        (collector, state)
    }

    #[test]
    fn test_end_to_end_capture_with_malformed_line() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = MockLineSource::new();
        source.push_line("21.0,55.0");
        source.push_line("bad-line");
        source.push_line("21.5,54.0");

        let (mut collector, state) = collector_with(tmp.path(), 2, source);

        assert!(matches!(collector.tick(), TickOutcome::Recorded { .. }));
        assert!(matches!(collector.tick(), TickOutcome::ParseFailed(_)));
        assert!(matches!(collector.tick(), TickOutcome::Recorded { .. }));

        let history = collector.store.load_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].temperature, 21.0);
        assert_eq!(history[0].humidity, 55.0);
        assert_eq!(history[1].temperature, 21.5);
        assert_eq!(history[1].humidity, 54.0);

        let latest = state.latest().expect("snapshot set");
        assert_eq!(latest.temperature, 21.5);
        assert_eq!(latest.humidity, 54.0);
    }

    #[test]
    fn test_malformed_line_leaves_snapshot_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = MockLineSource::new();
        source.push_line("21.0,55.0");
        source.push_line("nonsense,words");

        let (mut collector, state) = collector_with(tmp.path(), 10, source);

        collector.tick();
        collector.tick();

        let latest = state.latest().unwrap();
        assert_eq!(latest.temperature, 21.0);
        assert_eq!(collector.store.load_history().len(), 1);
    }

    #[test]
    fn test_quiet_device_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = MockLineSource::new();
        source.push_silence();

        let (mut collector, state) = collector_with(tmp.path(), 10, source);

        assert!(matches!(collector.tick(), TickOutcome::NoData));
        assert!(state.latest().is_none());
        assert!(collector.store.load_history().is_empty());
    }

    #[test]
    fn test_read_failure_is_survivable() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = MockLineSource::new();
        source.push_failure();
        source.push_line("20.0,50.0");

        let (mut collector, _state) = collector_with(tmp.path(), 10, source);

        assert!(matches!(collector.tick(), TickOutcome::ReadFailed(_)));
        assert!(matches!(collector.tick(), TickOutcome::Recorded { .. }));
        assert_eq!(collector.store.load_history().len(), 1);
    }

    #[test]
    fn test_no_device_yields_idle_ticks() {
        let tmp = tempfile::tempdir().unwrap();
        let state = AppState::new(Config::default());
        let store = Store::open(tmp.path(), RetentionPolicy::default()).unwrap();
        let mut collector = Collector::new(
            Arc::clone(&state),
            store,
            None,
            None,
            Duration::from_secs(1800),
        );

        assert!(matches!(collector.tick(), TickOutcome::Idle));
        assert!(matches!(collector.tick(), TickOutcome::Idle));
        assert!(state.latest().is_none());
    }

    /// Publisher double that records calls and fails on demand.
    struct RecordingPublisher {
        calls: Arc<Mutex<Vec<Vec<PathBuf>>>>,
        fail: bool,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&self, paths: &[PathBuf]) -> Result<PublishOutcome, PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push(paths.to_vec());
            if self.fail {
                Err(PublishError::Command {
                    command: "push",
                    stderr: "remote unreachable".to_string(),
                })
            } else {
                Ok(PublishOutcome::Published)
            }
        }
    }

    #[test]
    fn test_publish_invoked_after_persist() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let state = AppState::new(Config::default());
        let store = Store::open(tmp.path(), RetentionPolicy::default()).unwrap();
        let mut source = MockLineSource::new();
        source.push_line("21.0,55.0");

        let mut collector = Collector::new(
            Arc::clone(&state),
            store,
            Some(Box::new(source)),
            Some(Box::new(RecordingPublisher {
                calls: Arc::clone(&calls),
                fail: false,
            })),
            Duration::from_secs(1800),
        );

        assert!(matches!(collector.tick(), TickOutcome::Recorded { .. }));

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
    }

    #[test]
    fn test_publish_failure_does_not_fail_tick() {
        let tmp = tempfile::tempdir().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let state = AppState::new(Config::default());
        let store = Store::open(tmp.path(), RetentionPolicy::default()).unwrap();
        let mut source = MockLineSource::new();
        source.push_line("21.0,55.0");

        let mut collector = Collector::new(
            Arc::clone(&state),
            store,
            Some(Box::new(source)),
            Some(Box::new(RecordingPublisher {
                calls,
                fail: true,
            })),
            Duration::from_secs(1800),
        );

        // The tick still records even though publishing failed.
        assert!(matches!(collector.tick(), TickOutcome::Recorded { .. }));
        assert_eq!(collector.store.load_history().len(), 1);
    }
}
