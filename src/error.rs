//! Error types for string segment storage.

use std::io;
use thiserror::Error;

/// The result type used throughout strseg.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for string segment operations.
///
/// Broken invariants (header inconsistency, negative remaining space,
/// append after finalize) are not represented here: they panic.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Data corruption was detected, e.g. a truncated overflow chain or a
    /// payload that fails to decompress.
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// The requested block was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The segment is in the wrong state for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A checksum mismatch was detected.
    #[error("Checksum mismatch: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        /// The expected checksum value.
        expected: u32,
        /// The actual checksum value.
        actual: u32,
    },

    /// A value does not fit in the remaining space of the segment.
    ///
    /// The caller is expected to start a new segment or fall back to a
    /// different encoding.
    #[error("Capacity exhausted: value requires {required} bytes, {remaining} remaining")]
    CapacityExhausted {
        /// Bytes the value needs in the block (offset slot included).
        required: usize,
        /// Bytes left in the block.
        remaining: usize,
    },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Error::InvalidState(msg.into())
    }

    /// Creates a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::corruption("truncated overflow chain");
        assert_eq!(err.to_string(), "Data corruption: truncated overflow chain");

        let err = Error::ChecksumMismatch { expected: 0x12345678, actual: 0x87654321 };
        assert!(err.to_string().contains("0x12345678"));
        assert!(err.to_string().contains("0x87654321"));

        let err = Error::CapacityExhausted { required: 20, remaining: 12 };
        assert_eq!(
            err.to_string(),
            "Capacity exhausted: value requires 20 bytes, 12 remaining"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
