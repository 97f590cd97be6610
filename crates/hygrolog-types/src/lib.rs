//! Data types for the hygrolog temperature/humidity logger.
//!
//! This crate provides the shared types used by the capture loop, the store,
//! and the HTTP service:
//!
//! - [`Reading`]: one parsed temperature/humidity measurement
//! - [`DailyStats`]: per-day min/max/average statistics
//! - [`ParseError`]: errors produced by sensor line parsing
//!
//! # Example
//!
//! ```
//! use hygrolog_types::Reading;
//! use time::macros::datetime;
//!
//! let reading = Reading::parse_line("21.0,55.0", datetime!(2024-03-01 08:00:00)).unwrap();
//! assert_eq!(reading.temperature, 21.0);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{DailyStats, Reading, round2};
