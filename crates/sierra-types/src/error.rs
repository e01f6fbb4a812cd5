//! Error types for sierra-types.

use thiserror::Error;

/// Errors raised by the timestamp codec and time-of-day parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// The timestamp cannot be represented as a calendar date.
    #[error("Timestamp out of range: {0} us since 1899-12-30")]
    OutOfRange(i64),

    /// A time-of-day argument was not `HH:MM:SS[.fff]`.
    #[error("Invalid time of day: {0:?} (expected HH:MM:SS[.fff])")]
    InvalidTimeOfDay(String),
}

/// Errors raised when deriving a contract stem from a filename.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StemError {
    /// The filename does not end with the `.<day>.depth` suffix.
    #[error("Depth filename not in expected form: {name} (expected suffix {expected_suffix})")]
    NotDepthName {
        /// The offending filename.
        name: String,
        /// The suffix that was expected.
        expected_suffix: String,
    },
}
