//! Device I/O and side effects for the hygrolog sensor logger.
//!
//! This crate provides the pieces of the logger that touch the outside
//! world:
//!
//! - [`LineSource`]: the read seam of the capture loop, implemented by
//!   [`SerialLineSource`] for real hardware and [`MockLineSource`] for tests
//! - [`Publisher`] / [`GitPublisher`]: optional commit-and-push of the data
//!   files after persistence
//! - [`now_civil`]: the wall clock used to timestamp readings
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use hygrolog_core::{LineSource, SerialLineSource};
//!
//! let mut source = SerialLineSource::open("/dev/ttyUSB0", 9600, Duration::from_secs(2))?;
//! if let Some(line) = source.read_line()? {
//!     println!("raw: {line}");
//! }
//! # Ok::<(), hygrolog_core::Error>(())
//! ```

pub mod clock;
pub mod error;
pub mod mock;
pub mod publish;
pub mod source;

pub use clock::now_civil;
pub use error::{Error, Result};
pub use mock::MockLineSource;
pub use publish::{GitPublisher, PublishError, PublishOutcome, Publisher};
pub use source::{LineSource, SerialLineSource};
