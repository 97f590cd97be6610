//! Line sources: the seam between the capture loop and the device.

use std::io::BufRead;
use std::io::BufReader;
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use crate::error::{Error, Result};

/// A source of raw sensor lines.
///
/// One call performs at most one bounded read. `Ok(None)` means nothing
/// arrived within the read timeout; a quiet or disconnected device is not
/// an error, just an empty tick.
///
/// Implemented by [`SerialLineSource`] for real hardware and by
/// [`MockLineSource`](crate::MockLineSource) for tests.
pub trait LineSource: Send {
    /// Attempt to read one newline-terminated line.
    fn read_line(&mut self) -> Result<Option<String>>;
}

/// A [`LineSource`] backed by a serial port.
///
/// The port is opened once with a short read timeout so that a silent device
/// bounds each tick instead of hanging the capture loop.
pub struct SerialLineSource {
    reader: BufReader<Box<dyn SerialPort>>,
}

impl SerialLineSource {
    /// Open the given serial port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceUnavailable`] when the port cannot be opened;
    /// callers are expected to degrade to a no-op loop rather than abort.
    pub fn open(port: &str, baud: u32, read_timeout: Duration) -> Result<Self> {
        let serial = serialport::new(port, baud)
            .timeout(read_timeout)
            .open()
            .map_err(|e| Error::DeviceUnavailable {
                port: port.to_string(),
                source: e,
            })?;

        info!("Serial connected on {} at {} baud", port, baud);

        Ok(Self {
            reader: BufReader::new(serial),
        })
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            // EOF: port open but nothing buffered.
            Ok(0) => Ok(None),
            Ok(_) => {
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if line.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(line))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
