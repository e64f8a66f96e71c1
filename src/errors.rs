//! Error types for metadata decoding

use std::io;
use thiserror::Error;

/// Errors raised while sniffing an image
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No registered decoder recognized the stream
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// The magic number matched but the body is structurally broken
    #[error("Invalid image format: {0}")]
    InvalidFormat(String),

    /// A buffer was shorter than the value being decoded from it
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// A seek or read would cross the end of the stream
    #[error("Read out of bounds: {length} bytes at offset {offset}, stream length is {stream_len}")]
    OutOfBounds { offset: u64, length: u64, stream_len: u64 },

    /// Byte order marker was neither "II" nor "MM"
    #[error("Unrecognized byte order marker: {0:#06x}")]
    UnrecognizedByteOrder(u16),

    /// Tag definition file could not be parsed
    #[error("Tag registry error: {0}")]
    Registry(String),

    /// Command line usage problem
    #[error("{0}")]
    Command(String),

    /// I/O error from the underlying source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Whether this error came from a bounds check rather than the structure itself
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, DecodeError::BufferTooSmall { .. } | DecodeError::OutOfBounds { .. })
    }
}

impl From<String> for DecodeError {
    fn from(msg: String) -> Self {
        DecodeError::InvalidFormat(msg)
    }
}

/// Result type for decoding operations
pub type DecodeResult<T> = Result<T, DecodeError>;
