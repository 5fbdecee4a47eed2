//! Error type shared by every decoding step.

use thiserror::Error;

/// Everything that can go wrong while opening or reading a slob container.
///
/// Decoding never panics on bad input; a corrupted or truncated source always
/// surfaces as one of these variants.
#[derive(Debug, Error)]
pub enum SlobError {
    /// The underlying byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended before `len` bytes could be read at `pos`.
    #[error("short read: {len} bytes at offset {pos} run past the end of the source")]
    ShortRead { pos: u64, len: u64 },

    /// Bad magic, impossible offsets, or otherwise malformed structure.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unsupported encoding: {0:?} (only \"utf-8\" is supported)")]
    UnsupportedEncoding(String),

    /// The header names a codec outside the format's known set.
    #[error("unsupported compression: {0:?}")]
    UnsupportedCodec(String),

    #[error("invalid UTF-8 in text field at offset {pos}")]
    InvalidUtf8 { pos: u64 },

    /// The codec is valid per the header grammar but no decompressor is registered.
    #[error("no decompressor registered for codec {0:?}")]
    UnknownCodec(String),

    #[error("{codec} decompression failed: {source}")]
    CodecFailure {
        codec: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} index {index} out of range (size {len})")]
    OutOfRange {
        what: &'static str,
        index: u64,
        len: u64,
    },

    #[error("key not found: {0:?}")]
    NotFound(String),
}

impl SlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SlobError::NotFound(_))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, SlobError::OutOfRange { .. })
    }

    pub(crate) fn overflow(context: &str) -> Self {
        SlobError::InvalidFormat(format!("offset overflow while reading {context}"))
    }
}

/// A convenience `Result` alias using [`SlobError`].
pub type Result<T> = std::result::Result<T, SlobError>;
