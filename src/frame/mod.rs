//! Decoded pager frames and the parser that produces them.
//!
//! The demodulator prints one pipe-delimited record per received frame. This
//! module turns such a line into a typed [`DecodedFrame`] or rejects it as
//! [`NotAFrame`]; it performs no buffering and has no side effects.

pub mod error;
mod metadata;
mod parse;

pub use error::NotAFrame;
pub use metadata::{
    AddressType,
    Capcode,
    FragmentFlag,
    Fragmentation,
    FrameMetadata,
    FrameTiming,
    OPENING_FRAGMENT_INDICATOR,
    PageType,
    Protocol,
    Transmission,
};
pub use parse::{parse_bytes, parse_line};

/// One frame as printed by the demodulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Header fields, kept as the per-fragment metadata row.
    pub metadata: FrameMetadata,
    /// Message text carried by this frame.
    pub payload: String,
}

impl DecodedFrame {
    /// Grouping key of the frame.
    #[must_use]
    pub fn capcode(&self) -> &Capcode { &self.metadata.capcode }

    /// Fragment flag, treating frames without a descriptor as complete.
    #[must_use]
    pub fn flag(&self) -> FragmentFlag { self.metadata.flag() }
}
