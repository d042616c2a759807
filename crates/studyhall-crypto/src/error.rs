//! Error types for the peer codec.

use thiserror::Error;

/// Rejected hex input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("odd-length hex string ({0} characters)")]
    OddLength(usize),

    #[error("invalid hex character {c:?} at position {index}")]
    InvalidCharacter { c: char, index: usize },

    #[error("invalid decoded length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// Codec errors.
///
/// `DecryptionFailed` is deliberately opaque: tampering, a wrong key pair and
/// a corrupted transport all surface the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed {field}: {source}")]
    MalformedInput {
        field: &'static str,
        #[source]
        source: HexError,
    },

    #[error("envelope too short: {got} bytes, need at least {min}")]
    MalformedEnvelope { got: usize, min: usize },

    #[error("invalid {0} key")]
    InvalidKey(&'static str),

    #[error("public key does not match private key")]
    KeyMismatch,

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("secure random source unavailable")]
    Entropy,
}

impl CodecError {
    pub(crate) fn malformed(field: &'static str) -> impl FnOnce(HexError) -> Self {
        move |source| CodecError::MalformedInput { field, source }
    }

    /// True when the input was well formed but did not authenticate.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, CodecError::DecryptionFailed)
    }

    /// True when the input was rejected before any cryptography ran.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CodecError::MalformedInput { .. } | CodecError::MalformedEnvelope { .. }
        )
    }
}
