// Path: crates/drp-codec/src/error.rs
use thiserror::Error;

/// Errors produced while decoding a [`crate::Value`] or computing a
/// content hash over one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before a complete value could be read.
    #[error("truncated input: expected more bytes")]
    Truncated,
    /// A tag byte did not correspond to a known [`crate::Value`] variant.
    #[error("unknown value tag {0}")]
    UnknownTag(u8),
    /// A `Str` payload was not valid UTF-8.
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,
    /// The input had bytes left over after a complete value was decoded.
    #[error("trailing bytes after decoded value")]
    TrailingBytes,
}
