//! Error types for stream operations.
//!
//! Every error in this taxonomy is fatal to the operation in progress:
//! nothing is retried internally, and a stream that has reported an error
//! must be discarded and rebuilt rather than reused.

use std::io;
use thiserror::Error;

/// The main error type for OxiByte stream operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// A checked read was attempted past the last byte of the stream.
    #[error("End of stream reached")]
    EndOfStream,

    /// A backing resource could not be acquired.
    ///
    /// Raised by concrete source/sink implementations (file, socket, ...)
    /// during setup, never by the stream engine itself.
    #[error("Cannot open resource: {name}")]
    CannotOpen {
        /// Name or description of the resource.
        name: String,
    },

    /// The backing source reported a failure while producing bytes.
    #[error("Read from source failed: {source}")]
    ReadFailed {
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The backing sink reported a failure while consuming bytes.
    #[error("Write to sink failed: {source}")]
    WriteFailed {
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The codec reported a malformed or inconsistent compressed stream.
    #[error("Compression stream error: {message}")]
    CompressionStream {
        /// Description of the codec failure.
        message: String,
    },
}

/// Result type alias for OxiByte operations.
pub type Result<T> = std::result::Result<T, StreamError>;

impl StreamError {
    /// Create a cannot-open error.
    pub fn cannot_open(name: impl Into<String>) -> Self {
        Self::CannotOpen { name: name.into() }
    }

    /// Create a read-failed error from an I/O error.
    pub fn read_failed(source: io::Error) -> Self {
        Self::ReadFailed { source }
    }

    /// Create a write-failed error from an I/O error.
    pub fn write_failed(source: io::Error) -> Self {
        Self::WriteFailed { source }
    }

    /// Create a compression stream error.
    pub fn compression(message: impl Into<String>) -> Self {
        Self::CompressionStream {
            message: message.into(),
        }
    }
}
