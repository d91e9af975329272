//! Inner "PYCD" payload block
//!
//! The payload carries the program text, optionally preceded by a long
//! filename. On the wire:
//!
//! ```text
//! bare:  "PYCD" 00 <source...>
//! named: "PYCD" <name_len> 01 <name...> 00 <source...>
//! ```
//!
//! No byte in the source or filename is escaped; the declared lengths are
//! authoritative and embedded terminators are never scanned for.

use bytes::Bytes;

use super::{Error, PAYLOAD_MAGIC, Result, SOH};

/// The filename/no-filename branch as a tagged variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Source bytes only; the NUL terminator directly follows the tag.
    Bare(Bytes),
    /// Source bytes preceded by an embedded long filename.
    Named {
        /// Embedded filename, at most 255 bytes.
        name: Bytes,
        /// Program text.
        source: Bytes,
    },
}

impl Payload {
    /// Exact encoded length of this block.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            // tag + NUL
            Self::Bare(source) => PAYLOAD_MAGIC.len() + 1 + source.len(),
            // tag + name_len + SOH + name + NUL
            Self::Named { name, source } => PAYLOAD_MAGIC.len() + 3 + name.len() + source.len(),
        }
    }

    /// Append the composed block to `out`.
    pub fn compose_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&PAYLOAD_MAGIC);
        match self {
            Self::Bare(source) => {
                out.push(0x00);
                out.extend_from_slice(source);
            }
            Self::Named { name, source } => {
                out.push(name.len() as u8);
                out.push(SOH);
                out.extend_from_slice(name);
                out.push(0x00);
                out.extend_from_slice(source);
            }
        }
    }

    /// Split a payload block back into filename and source.
    ///
    /// `block` must span exactly the declared inner size, from the "PYCD"
    /// tag to the last source byte. Returned buffers are fresh copies.
    pub fn parse(block: &[u8]) -> Result<Self> {
        let tag_len = PAYLOAD_MAGIC.len();
        if block.len() < tag_len + 1 {
            return Err(Error::ParseError {
                reason: "payload block shorter than its framing",
            });
        }
        if block[..tag_len] != PAYLOAD_MAGIC {
            return Err(Error::ParseError {
                reason: "missing PYCD payload tag",
            });
        }

        let name_len = block[tag_len] as usize;
        if name_len == 0 {
            // The length byte doubles as the NUL terminator.
            return Ok(Self::Bare(Bytes::copy_from_slice(&block[tag_len + 1..])));
        }

        let name_start = tag_len + 2;
        let nul_at = name_start + name_len;
        if block.len() < nul_at + 1 {
            return Err(Error::ParseError {
                reason: "embedded filename exceeds payload block",
            });
        }
        if block[tag_len + 1] != SOH {
            return Err(Error::ParseError {
                reason: "missing SOH marker before embedded filename",
            });
        }
        if block[nul_at] != 0x00 {
            return Err(Error::ParseError {
                reason: "missing NUL terminator after embedded filename",
            });
        }

        Ok(Self::Named {
            name: Bytes::copy_from_slice(&block[name_start..nul_at]),
            source: Bytes::copy_from_slice(&block[nul_at + 1..]),
        })
    }

    /// Program text.
    #[must_use]
    pub fn source(&self) -> &Bytes {
        match self {
            Self::Bare(source) | Self::Named { source, .. } => source,
        }
    }

    /// Embedded filename, if any.
    #[must_use]
    pub fn name(&self) -> Option<&Bytes> {
        match self {
            Self::Bare(_) => None,
            Self::Named { name, .. } => Some(name),
        }
    }

    /// Consume the block into `(filename, source)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<Bytes>, Bytes) {
        match self {
            Self::Bare(source) => (None, source),
            Self::Named { name, source } => (Some(name), source),
        }
    }
}
