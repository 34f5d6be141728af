//! Payload transforms applied to a message before it reaches any sink.
//!
//! A transform runs once per flushed logical message, never per fragment. The
//! default leaves text untouched; digesting keeps message contents out of the
//! logs while still letting duplicates be spotted; sealing encrypts the text
//! for readers holding the key.

pub mod error;
mod seal;

use std::fmt;

pub use error::TransformError;
pub use seal::{Seal, SealKey, associated_data};
use sha2::{Digest, Sha256};

use crate::frame::{Capcode, FrameMetadata};

/// Hook rewriting message text (and optionally capcodes) before persistence.
///
/// Closures taking `&str` and returning `String` implement the trait, leaving
/// capcodes untouched.
///
/// # Examples
///
/// ```
/// use pagerframe::transform::PayloadTransform;
///
/// let shout = |text: &str| text.to_uppercase();
/// assert_eq!(shout.transform_text("hello").expect("infallible"), "HELLO");
/// ```
pub trait PayloadTransform: Send + Sync {
    /// Rewrite the concatenated message text.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the transform cannot process the text.
    fn transform_text(&self, text: &str) -> Result<String, TransformError>;

    /// Rewrite the text of a message whose fragments carried `rows`.
    ///
    /// Defaults to [`transform_text`](Self::transform_text). Transforms that
    /// bind their output to the message metadata override this.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] if the transform cannot process the text.
    fn transform_message(
        &self,
        _rows: &[FrameMetadata],
        text: &str,
    ) -> Result<String, TransformError> {
        self.transform_text(text)
    }

    /// Rewrite the capcode written in each metadata row.
    fn transform_capcode(&self, capcode: &Capcode) -> Capcode { capcode.clone() }
}

impl<F> PayloadTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform_text(&self, text: &str) -> Result<String, TransformError> { Ok(self(text)) }
}

/// Writes plaintext unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl PayloadTransform for Identity {
    fn transform_text(&self, text: &str) -> Result<String, TransformError> { Ok(text.to_owned()) }
}

/// Replaces text (and optionally capcodes) with its lowercase hex SHA-256.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digest {
    /// Also digest the capcode field of every metadata row.
    pub capcodes: bool,
}

/// Lowercase hex SHA-256 of `input`.
#[must_use]
pub fn sha256_hex(input: &str) -> String { hex::encode(Sha256::digest(input.as_bytes())) }

impl PayloadTransform for Sha256Digest {
    fn transform_text(&self, text: &str) -> Result<String, TransformError> {
        Ok(sha256_hex(text))
    }

    fn transform_capcode(&self, capcode: &Capcode) -> Capcode {
        if self.capcodes {
            Capcode::from(sha256_hex(capcode.as_str()))
        } else {
            capcode.clone()
        }
    }
}

/// Configured transform, selected at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TransformKind {
    /// Plaintext output.
    #[default]
    Identity,
    /// Digest message text.
    Digest,
    /// Digest message text and capcodes.
    DigestAll,
    /// Encrypt message text with the given key.
    Seal(SealKey),
}

impl TransformKind {
    /// Instantiate the configured transform.
    #[must_use]
    pub fn build(&self) -> Box<dyn PayloadTransform> {
        match self {
            Self::Identity => Box::new(Identity),
            Self::Digest => Box::new(Sha256Digest { capcodes: false }),
            Self::DigestAll => Box::new(Sha256Digest { capcodes: true }),
            Self::Seal(key) => Box::new(Seal::new(key)),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("none"),
            Self::Digest => f.write_str("digest"),
            Self::DigestAll => f.write_str("digest-all"),
            Self::Seal(_) => f.write_str("seal"),
        }
    }
}

#[cfg(test)]
mod tests;
