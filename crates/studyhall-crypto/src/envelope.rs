//! Wire form of an encrypted peer message: `nonce(24) || ciphertext+tag`.

use crate::error::CodecError;
use crate::hex::{bytes_to_hex, hex_to_bytes};

/// XChaCha20 nonce length.
pub const NONCE_LEN: usize = 24;
/// Poly1305 tag length.
pub const TAG_LEN: usize = 16;
/// Smallest valid envelope (empty plaintext).
pub const MIN_ENVELOPE_LEN: usize = NONCE_LEN + TAG_LEN;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// A fresh random nonce. Every seal must use a new one.
    pub(crate) fn fresh_nonce() -> Result<[u8; NONCE_LEN], CodecError> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::getrandom(&mut nonce).map_err(|_| CodecError::Entropy)?;
        Ok(nonce)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(CodecError::MalformedEnvelope {
                got: bytes.len(),
                min: MIN_ENVELOPE_LEN,
            });
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let mut n = [0u8; NONCE_LEN];
        n.copy_from_slice(nonce);
        Ok(Self {
            nonce: n,
            ciphertext: ciphertext.to_vec(),
        })
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let bytes = hex_to_bytes(s).map_err(CodecError::malformed("ciphertext"))?;
        Self::from_bytes(&bytes)
    }
}
