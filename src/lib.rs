//! tipyconv - codec for the TI Python AppVar (8xv) container format
//!
//! This library converts program text to and from the binary container the
//! TI-83 Premium CE / TI-84 Plus CE Python edition uses for variable
//! storage. The core is the pure codec in [`appvar`]; the [`convert`]
//! module layers format detection and file IO on top of it for the
//! `tipyconv` binary.
//!
//! # Quick Start
//!
//! ```rust
//! use tipyconv::Record;
//!
//! // Pack program text into a container
//! let record = Record::new("print(\"hello\")", Some(b"HELLO"))?;
//! let bytes = record.encode();
//!
//! // Unpack it again
//! let decoded = tipyconv::decode(&bytes)?;
//! assert_eq!(decoded.source(), record.source());
//! # Ok::<(), tipyconv::Error>(())
//! ```
//!
//! # Format
//!
//! - **Fixed-width header** - 11-byte signature, 42-byte comment, 8-byte
//!   variable name, with every multi-byte size field little-endian
//! - **Nested payload** - an inner `"PYCD"` block carrying an optional long
//!   filename and the source bytes
//! - **Trailing checksum** - the low 16 bits of a byte sum, matching the
//!   verification the calculator performs on load

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod appvar;
pub mod convert;

pub use appvar::{Error, Payload, Record, Result, decode, encode};
pub use convert::{ConvertError, Format, Options};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
