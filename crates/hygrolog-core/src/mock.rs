//! Mock line source for testing.
//!
//! This module provides a scripted [`LineSource`] that can be used for unit
//! testing without serial hardware.
//!
//! # Features
//!
//! - **Scripted lines**: each call pops the next scripted step
//! - **Silence**: a step can yield nothing, like a read timeout
//! - **Failure injection**: a step can fail with an I/O error
//!
//! # Example
//!
//! ```
//! use hygrolog_core::{LineSource, MockLineSource};
//!
//! let mut source = MockLineSource::new();
//! source.push_line("21.0,55.0");
//! source.push_silence();
//!
//! assert_eq!(source.read_line().unwrap(), Some("21.0,55.0".to_string()));
//! assert_eq!(source.read_line().unwrap(), None);
//! // Script exhausted: behaves like a quiet device.
//! assert_eq!(source.read_line().unwrap(), None);
//! ```

use std::collections::VecDeque;

use crate::error::Result;
use crate::source::LineSource;

enum Step {
    Line(String),
    Silence,
    Fail,
}

/// A scripted line source for tests.
#[derive(Default)]
pub struct MockLineSource {
    script: VecDeque<Step>,
}

impl MockLineSource {
    /// Create an empty mock source (reads behave like a quiet device).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a line to be returned by the next read.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.script.push_back(Step::Line(line.into()));
    }

    /// Script a read that returns nothing, like a timeout.
    pub fn push_silence(&mut self) {
        self.script.push_back(Step::Silence);
    }

    /// Script a read that fails with an I/O error.
    pub fn push_failure(&mut self) {
        self.script.push_back(Step::Fail);
    }

    /// Number of scripted steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl LineSource for MockLineSource {
    fn read_line(&mut self) -> Result<Option<String>> {
        match self.script.pop_front() {
            Some(Step::Line(line)) => Ok(Some(line)),
            Some(Step::Silence) | None => Ok(None),
            Some(Step::Fail) => Err(std::io::Error::other("injected read failure").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_lines_in_order() {
        let mut source = MockLineSource::new();
        source.push_line("21.0,55.0");
        source.push_line("21.5,54.0");

        assert_eq!(source.read_line().unwrap(), Some("21.0,55.0".to_string()));
        assert_eq!(source.read_line().unwrap(), Some("21.5,54.0".to_string()));
        assert_eq!(source.read_line().unwrap(), None);
    }

    #[test]
    fn test_silence_and_failure() {
        let mut source = MockLineSource::new();
        source.push_silence();
        source.push_failure();
        source.push_line("20.0,50.0");

        assert_eq!(source.read_line().unwrap(), None);
        assert!(source.read_line().is_err());
        assert_eq!(source.read_line().unwrap(), Some("20.0,50.0".to_string()));
        assert_eq!(source.remaining(), 0);
    }
}
