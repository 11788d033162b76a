//! Definitions of error related things.

use std::fmt;

use crate::chunk::CompressionType;

/// Errors of this crate.
#[derive(Debug)]
#[non_exhaustive]
pub enum PackageError {
    /// A package header named a compression type code with no registered codec.
    UnknownCompression(u8),
    /// The codec is registered but its optional backend is unavailable.
    UnsupportedCompression(CompressionType),
    /// A package or atlas version number isn't one the reader accepts.
    UnsupportedVersion(i32),
    /// A read ran past the end of its input, or a magic/sentinel byte didn't match.
    MalformedInput(String),
    /// A value couldn't be encoded: too long, or out of range for its field.
    EncodingError(String),
    /// An export/import path extension isn't recognized for the entry type.
    UnsupportedFormat(String),
    /// The operation is not implemented (LZX, or import for a type without an .entry path).
    NotImplemented(String),
    /// Wrapper around an io error from the std lib.
    IoError(std::io::Error),
    /// A loose atlas/bink-atlas JSON export couldn't be parsed or serialized.
    JsonError(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PackageError>;

impl From<std::io::Error> for PackageError {
    fn from(e: std::io::Error) -> Self {
        PackageError::IoError(e)
    }
}

impl From<serde_json::Error> for PackageError {
    fn from(e: serde_json::Error) -> Self {
        PackageError::JsonError(e)
    }
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PackageError::UnknownCompression(code) => {
                write!(f, "unknown compression type code: 0x{:02X}", code)
            }
            PackageError::UnsupportedCompression(kind) => {
                write!(f, "compression backend unavailable for {:?}", kind)
            }
            PackageError::UnsupportedVersion(v) => write!(f, "unsupported version: {}", v),
            PackageError::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            PackageError::EncodingError(msg) => write!(f, "encoding error: {}", msg),
            PackageError::UnsupportedFormat(ext) => write!(f, "unsupported format: {}", ext),
            PackageError::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
            PackageError::IoError(e) => write!(f, "io error: {}", e),
            PackageError::JsonError(e) => write!(f, "json error: {}", e),
        }
    }
}

impl std::error::Error for PackageError {}
