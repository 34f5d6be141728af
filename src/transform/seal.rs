//! Authenticated encryption of message text with ChaCha20-Poly1305.
//!
//! Sealed records are rendered as uppercase hex of `nonce || ciphertext || tag`
//! so they fit in a single line-log line or CSV field. A record sealed for a
//! message is bound to the timing of the message's first fragment, which the
//! logs carry next to it; moving the record onto other rows makes it fail to
//! open.

use std::{fmt, str::FromStr};

use chacha20poly1305::{
    AeadCore,
    ChaCha20Poly1305,
    Key,
    KeyInit,
    Nonce,
    aead::{Aead, OsRng, Payload},
};

use super::{PayloadTransform, TransformError};
use crate::frame::FrameMetadata;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// 256-bit pre-shared key.
#[derive(Clone, PartialEq, Eq)]
pub struct SealKey([u8; KEY_LEN]);

impl SealKey {
    /// Wrap raw key bytes.
    #[must_use]
    pub const fn new(bytes: [u8; KEY_LEN]) -> Self { Self(bytes) }
}

impl FromStr for SealKey {
    type Err = TransformError;

    fn from_str(hex_key: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(hex_key.trim()).map_err(TransformError::KeyEncoding)?;
        let found = bytes.len();
        let bytes: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| TransformError::KeyLength { found })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("SealKey(..)") }
}

/// Transform that encrypts message text under a fixed key.
///
/// Every call draws a fresh nonce, so sealing the same text twice yields
/// different records.
pub struct Seal {
    cipher: ChaCha20Poly1305,
}

impl Seal {
    /// Build a sealing transform for `key`.
    #[must_use]
    pub fn new(key: &SealKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key.0)),
        }
    }

    /// Encrypt `plaintext`, authenticating `aad` alongside it, and return the
    /// hex-encoded record.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Seal`] if the cipher rejects the input.
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<String, TransformError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, Payload { msg: plaintext, aad })
            .map_err(|_| TransformError::Seal)?;
        let mut record = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        record.extend_from_slice(&nonce);
        record.extend_from_slice(&ciphertext);
        Ok(hex::encode_upper(record))
    }

    /// Decrypt a record produced by [`seal`](Self::seal) with the same `aad`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the record is malformed, fails
    /// authentication (including a mismatched `aad`), or does not hold UTF-8
    /// text.
    pub fn open(&self, record: &str, aad: &[u8]) -> Result<String, TransformError> {
        let bytes = hex::decode(record.trim()).map_err(TransformError::RecordEncoding)?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(TransformError::Truncated { len: bytes.len() });
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad })
            .map_err(|_| TransformError::Open)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

impl fmt::Debug for Seal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Seal") }
}

/// Associated data binding a sealed record to its message: the rendered
/// timing of the first fragment, e.g. `08.103.C`, or nothing for a message
/// without rows.
#[must_use]
pub fn associated_data(rows: &[FrameMetadata]) -> String {
    rows.first()
        .map(|row| row.timing.to_string())
        .unwrap_or_default()
}

impl PayloadTransform for Seal {
    fn transform_text(&self, text: &str) -> Result<String, TransformError> {
        self.seal(text.as_bytes(), &[])
    }

    fn transform_message(
        &self,
        rows: &[FrameMetadata],
        text: &str,
    ) -> Result<String, TransformError> {
        self.seal(text.as_bytes(), associated_data(rows).as_bytes())
    }
}
