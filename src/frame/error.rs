//! Reasons a line is rejected as non-data.
//!
//! A rejected line is never fatal: the reader logs the reason and moves on to
//! the next line.

use thiserror::Error;

/// A line that does not describe a decodable data frame.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotAFrame {
    /// Header, banner or noise line with too few fields.
    #[error("expected at least 7 pipe-delimited fields, found {found}")]
    TooFewFields {
        /// Number of fields present.
        found: usize,
    },
    /// The `cycle.num.phase` field did not parse.
    #[error("malformed frame timing `{0}`")]
    Timing(String),
    /// The address type was not exactly two characters.
    #[error("address type must be two characters, found `{0}`")]
    AddressType(String),
    /// The numeric page type code did not parse.
    #[error("malformed page type code `{0}`")]
    PageTypeCode(String),
    /// The page type token is not one the reassembler understands.
    #[error("unknown page type `{0}`")]
    PageType(String),
    /// The `indicator.continuation.flag` descriptor did not parse.
    #[error("malformed fragmentation descriptor `{0}`")]
    Fragmentation(String),
    /// An alphanumeric frame arrived without its descriptor and payload fields.
    #[error("alphanumeric frame is missing its fragmentation descriptor")]
    MissingFragmentation,
    /// The line bytes were not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}
