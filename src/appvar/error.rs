//! AppVar codec error types

use thiserror::Error;

use super::Record;

/// AppVar codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Signature mismatch: the buffer is not an 8xv container
    #[error("invalid file signature: not a TI-83/84 variable file")]
    InvalidFormat,

    /// Truncated buffer or internally inconsistent lengths
    #[error("malformed container: {reason}")]
    ParseError {
        /// What the parser tripped over
        reason: &'static str,
    },

    /// Recomputed checksum disagrees with the stored trailer
    #[error("checksum mismatch: computed {computed:#06x}, stored {stored:#06x}")]
    ChecksumMismatch {
        /// Checksum recomputed over the buffer
        computed: u16,
        /// Checksum stored in the trailing two bytes
        stored: u16,
        /// Fields recovered before verification failed. Untrusted.
        record: Box<Record>,
    },

    /// Construction-time precondition violation: oversized source or filename
    #[error("{field} too long: {len} bytes (max {max})")]
    InvalidInput {
        /// Offending field
        field: &'static str,
        /// Supplied length
        len: usize,
        /// Format limit
        max: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
