//! Error types for hygrolog-core.
//!
//! These cover the device side of the logger: opening and reading the serial
//! port. None of them is fatal to the capture loop: an unopenable port
//! degrades the loop to sleep-only, and a failed read is skipped until the
//! next tick.

use thiserror::Error;

/// Result type for hygrolog-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the sensor device.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The serial port could not be opened at startup.
    #[error("Serial device {port} unavailable: {source}")]
    DeviceUnavailable {
        /// Port name, e.g. `/dev/ttyUSB0`.
        port: String,
        source: serialport::Error,
    },

    /// A read from the open port failed.
    #[error("Serial read failed: {0}")]
    Io(#[from] std::io::Error),
}
