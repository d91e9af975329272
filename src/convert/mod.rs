//! Text ⇄ AppVar conversion driver
//!
//! The effectful layer around the pure codec: format detection, output-path
//! inference, and file IO. Everything the caller can tune travels in one
//! explicit [`Options`] value; nothing in this module holds global state.

mod inspect;

pub use inspect::disassemble;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::appvar::{self, Record};

/// File formats the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain program text.
    Text,
    /// TI AppVar container.
    AppVar,
}

impl Format {
    /// Parse a user-supplied format name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" | "txt" | "py" => Some(Self::Text),
            "8xv" | "appvar" => Some(Self::AppVar),
            _ => None,
        }
    }

    /// Infer the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Extension written when converting into this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "py",
            Self::AppVar => "8xv",
        }
    }

    /// The format on the other side of a conversion.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Text => Self::AppVar,
            Self::AppVar => Self::Text,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::AppVar => "8xv",
        };
        write!(f, "{name}")
    }
}

/// Conversion request assembled by the caller (typically the CLI).
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Output path; inferred from the input path when absent.
    pub output: Option<PathBuf>,
    /// Input format override; the file extension decides when absent.
    pub format: Option<Format>,
    /// Target format override; the opposite direction when absent.
    pub target_format: Option<Format>,
    /// On-calculator variable name (text → 8xv only).
    pub var_name: Option<Vec<u8>>,
    /// Long filename embedded in the payload (text → 8xv only).
    pub long_name: Option<Vec<u8>>,
    /// Container comment (text → 8xv only).
    pub comment: Option<Vec<u8>>,
}

/// Conversion-layer errors
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Neither an override nor the file extension names a known format
    #[error("cannot determine the format of `{}`: unknown extension", path.display())]
    UnknownFormat {
        /// Path whose format could not be determined
        path: PathBuf,
    },

    /// Input and target formats came out identical
    #[error("input and target formats are both {format}")]
    SameFormat {
        /// The format on both sides
        format: Format,
    },

    /// Codec failure
    #[error("codec error: {0}")]
    Codec(#[from] appvar::Error),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert `input` according to `opts`; returns the path written.
///
/// The input format comes from `opts.format` or else the file extension; the
/// target format defaults to the opposite direction; the output path
/// defaults to the input path with the target extension.
pub fn convert(input: &Path, opts: &Options) -> Result<PathBuf, ConvertError> {
    let from = opts
        .format
        .or_else(|| Format::from_path(input))
        .ok_or_else(|| ConvertError::UnknownFormat {
            path: input.to_path_buf(),
        })?;
    let to = opts.target_format.unwrap_or_else(|| from.counterpart());
    if from == to {
        return Err(ConvertError::SameFormat { format: to });
    }

    let data = fs::read(input)?;
    debug!(input = %input.display(), bytes = data.len(), %from, %to, "read input");

    let converted = match to {
        Format::AppVar => {
            let mut record = Record::new(data, opts.var_name.as_deref())?;
            if let Some(name) = &opts.long_name {
                record = record.with_long_name(name.clone())?;
            }
            if let Some(comment) = &opts.comment {
                record = record.with_comment(comment);
            }
            record.encode()
        }
        Format::Text => {
            let record = appvar::decode(&data)?;
            record.source().to_vec()
        }
    };

    let output = match &opts.output {
        Some(path) => path.clone(),
        None => input.with_extension(to.extension()),
    };
    fs::write(&output, &converted)?;
    debug!(output = %output.display(), bytes = converted.len(), "wrote output");

    Ok(output)
}
