//! Error types for reading, laying out and uploading KTX containers.

use thiserror::Error;

use crate::backend::BackendError;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, KtxError>;

#[derive(Error, Debug)]
pub enum KtxError {
    /// File could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is malformed or uses something this loader does not handle.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// A texture backend call reported failure.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Bad texel access on a texture being written.
    #[error("texel error: {0}")]
    Texel(String),
}

impl KtxError {
    pub fn texel<S: Into<String>>(msg: S) -> Self {
        Self::Texel(msg.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not enough data: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("invalid file header")]
    BadMagic,

    #[error("invalid header field endianness: {0:#010x}")]
    BadEndianness(u32),

    #[error("invalid dimension")]
    InvalidDimension,

    #[error("unsupported base internal format: {0:#06x}")]
    UnsupportedFormat(u32),

    #[error("row alignment must be non-zero, got {0}")]
    BadAlignment(u32),

    #[error("compressed formats are not supported")]
    Compressed,

    #[error("image data out of bounds: {length} bytes at offset {offset}, {available} available")]
    OutOfBounds {
        offset: u64,
        length: u64,
        available: u64,
    },

    #[error("image layout overflows")]
    Overflow,
}
