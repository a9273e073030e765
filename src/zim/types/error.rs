//! Custom error types for the zim-reader crate.

use std::io;
use thiserror::Error;

use super::models::{EntryType, UrlNamespace};

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum ZimError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(io::Error),

    /// The stream ended before a field could be read completely.
    #[error("Truncated stream: fewer bytes available than the field requires")]
    TruncatedStream,

    /// The first four bytes are not the ZIM magic number.
    #[error("Bad magic number {0:#010x}, stream is not a ZIM archive")]
    BadMagic(u32),

    /// The archive predates format version 5.
    #[error("Unsupported ZIM version {major}.{minor}. Only 5.0 and later are supported.")]
    UnsupportedVersion { major: u16, minor: u16 },

    /// The archive is structurally invalid or does not match the documented layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No entry with this URL exists in the namespace.
    #[error("No entry found for {namespace}/{url}")]
    NotFound { namespace: UrlNamespace, url: String },

    /// A field was read from an entry variant that does not carry it.
    #[error("Invalid variant access: expected {expected:?} entry, found {found:?}")]
    InvalidVariantAccess { expected: EntryType, found: EntryType },

    /// A cluster could not be decompressed, or uses an unsupported codec.
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

impl From<io::Error> for ZimError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => ZimError::TruncatedStream,
            _ => ZimError::Io(err),
        }
    }
}

/// A convenience `Result` type alias using the crate's `ZimError` type.
pub type Result<T> = std::result::Result<T, ZimError>;
