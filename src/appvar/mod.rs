//! AppVar container core implementation
//!
//! This module provides the wire format, the decoded record type, and the
//! codec for the TI Python AppVar (8xv) container.

mod checksum;
mod codec;
mod error;
mod payload;
mod record;

pub use checksum::checksum;
pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use payload::Payload;
pub use record::Record;

/// Fixed 11-byte file signature: `**TI83F*` followed by `0x1A 0x0A 0x00`.
pub const SIGNATURE: [u8; 11] = [
    0x2A, 0x2A, 0x54, 0x49, 0x38, 0x33, 0x46, 0x2A, 0x1A, 0x0A, 0x00,
];

/// Size of the free-form comment field.
pub const COMMENT_LEN: usize = 42;

/// Size of the on-calculator variable name field.
pub const VAR_NAME_LEN: usize = 8;

/// Variable name used when the caller supplies none.
pub const DEFAULT_VAR_NAME: [u8; VAR_NAME_LEN] = *b"TIPYFILE";

/// ASCII tag opening the inner payload block.
pub const PAYLOAD_MAGIC: [u8; 4] = *b"PYCD";

/// Variable-type id of a Python AppVar.
pub const APPVAR_TYPE_ID: u8 = 0x15;

/// Fixed tag distinguishing this variable entry's sub-type.
pub const ENTRY_TAG: [u8; 2] = [0x0D, 0x00];

/// Marker byte preceding an embedded filename inside the payload.
pub const SOH: u8 = 0x01;

/// Maximum source length for a record without a long filename. Every 16-bit
/// size field must stay representable; the tightest is the data size, which
/// adds 24 bytes of fixed overhead to the source. A long filename consumes a
/// further `len + 2` bytes of the same allowance.
pub const MAX_SOURCE_LEN: usize = u16::MAX as usize - 24;

/// Maximum embedded filename length (its length field is 8 bits).
pub const MAX_LONG_NAME_LEN: usize = u8::MAX as usize;

/// Absolute offset of the comment field.
pub const OFFSET_COMMENT: usize = 0x0B;

/// Absolute offset of the 16-bit data-size field.
pub const OFFSET_DATA_SIZE: usize = 0x35;

/// Absolute offset of the entry tag; the checksum range starts here.
pub const OFFSET_ENTRY_TAG: usize = 0x37;

/// Absolute offset of the 16-bit outer payload size.
pub const OFFSET_OUTER_SIZE: usize = 0x39;

/// Absolute offset of the variable-type id byte.
pub const OFFSET_TYPE_ID: usize = 0x3B;

/// Absolute offset of the variable name field.
pub const OFFSET_VAR_NAME: usize = 0x3C;

/// Absolute offset of the two zero padding bytes.
pub const OFFSET_PADDING: usize = 0x44;

/// Absolute offset of the repeated outer payload size. The device writes the
/// same 16-bit value at [`OFFSET_OUTER_SIZE`] and here.
pub const OFFSET_OUTER_SIZE_REPEAT: usize = 0x46;

/// Absolute offset of the 16-bit inner payload size.
pub const OFFSET_INNER_SIZE: usize = 0x48;

/// Absolute offset of the payload block ("PYCD"...).
pub const OFFSET_PAYLOAD: usize = 0x4A;

/// Start of the checksummed range.
pub const CHECKSUM_START: usize = OFFSET_ENTRY_TAG;

/// Size of the trailing checksum.
pub const CHECKSUM_LEN: usize = 2;

/// Smallest well-formed container: empty bare payload plus checksum.
pub const MIN_CONTAINER_LEN: usize = OFFSET_PAYLOAD + PAYLOAD_MAGIC.len() + 1 + CHECKSUM_LEN;
