//! Error types for sensor line parsing in hygrolog-types.

use thiserror::Error;

/// Errors that can occur when parsing a raw sensor line.
///
/// This error type is device-agnostic: it only describes the shape of the
/// text, not how the text was obtained (serial I/O errors belong in
/// hygrolog-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The line was empty (or whitespace only).
    #[error("Empty sensor line")]
    EmptyLine,

    /// The line did not split into exactly two comma-separated fields.
    #[error("Expected 2 comma-separated fields, got {actual} in {line:?}")]
    FieldCount {
        /// Number of fields actually present.
        actual: usize,
        /// The offending line.
        line: String,
    },

    /// A field was present but was not a finite decimal number.
    #[error("Invalid {field} value {value:?}")]
    InvalidNumber {
        /// Which field failed ("temperature" or "humidity").
        field: &'static str,
        /// The offending text.
        value: String,
    },
}

/// Result type alias using hygrolog-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
