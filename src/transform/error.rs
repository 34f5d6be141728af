//! Errors raised while configuring or applying payload transforms.

use std::string::FromUtf8Error;

use hex::FromHexError;
use thiserror::Error;

/// Errors produced by [`PayloadTransform`](super::PayloadTransform)
/// implementations and key parsing.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The seal key was not valid hexadecimal.
    #[error("seal key is not valid hex: {0}")]
    KeyEncoding(#[source] FromHexError),
    /// The seal key decoded to the wrong number of bytes.
    #[error("seal key must be 32 bytes, found {found}")]
    KeyLength {
        /// Decoded key length.
        found: usize,
    },
    /// Encryption failed.
    #[error("failed to seal message")]
    Seal,
    /// A sealed record was not valid hexadecimal.
    #[error("sealed record is not valid hex: {0}")]
    RecordEncoding(#[source] FromHexError),
    /// A sealed record was too short to hold a nonce and tag.
    #[error("sealed record truncated to {len} bytes")]
    Truncated {
        /// Decoded record length.
        len: usize,
    },
    /// Authentication failed while opening a sealed record.
    #[error("sealed record failed authentication")]
    Open,
    /// The opened plaintext was not UTF-8.
    #[error("opened plaintext is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}
