//! Error types for b3dkit-common.

use thiserror::Error;

/// Common error type for b3dkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing null terminator in string.
    #[error("string at offset {0} missing null terminator")]
    MissingNullTerminator(usize),

    /// Name does not fit in a fixed 32-byte field.
    #[error("name {name:?} is {len} bytes long, the limit is 32")]
    NameTooLong { name: String, len: usize },

    /// Text contains characters outside the cp1251 code page.
    #[error("text {0:?} cannot be encoded as cp1251")]
    Unencodable(String),

    /// Malformed wildcard pattern.
    #[error("invalid wildcard pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A reserved placeholder was never patched before finishing the buffer.
    #[error("{0} reserved placeholder(s) were never patched")]
    UnpatchedPlaceholder(usize),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
