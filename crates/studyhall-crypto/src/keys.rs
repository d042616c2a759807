//! User key pairs for peer chat.
//!
//! Each user holds one X25519 key pair. The public half is shared with peers
//! through an external directory; the private half never leaves the owner.
//! Secret material is zeroized when dropped.

use std::fmt;

use constant_time_eq::constant_time_eq_32;
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as X25519PublicKey, SharedSecret, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{CodecError, HexError};
use crate::hex::{bytes_to_hex, hex_to_array};

/// Length in bytes of both halves of a key pair.
pub const KEY_LEN: usize = 32;

/// X25519 public key. Safe to share.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        hex_to_array(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.0)
    }

    pub(crate) fn to_x25519(self) -> X25519PublicKey {
        X25519PublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// X25519 private key. Zeroized on drop; `Debug` never prints key bytes.
#[derive(Clone)]
pub struct SecretKey(StaticSecret);

impl SecretKey {
    /// Draw a fresh key from the OS random source.
    pub fn generate() -> Result<Self, CodecError> {
        let mut seed = Zeroizing::new([0u8; KEY_LEN]);
        getrandom::getrandom(&mut seed[..]).map_err(|_| CodecError::Entropy)?;
        Ok(Self(StaticSecret::from(*seed)))
    }

    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, HexError> {
        let bytes = Zeroizing::new(hex_to_array::<KEY_LEN>(s)?);
        Ok(Self(StaticSecret::from(*bytes)))
    }

    /// Export as lowercase hex. The returned string is wiped when dropped.
    pub fn to_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.0.to_bytes());
        Zeroizing::new(bytes_to_hex(&bytes[..]))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*X25519PublicKey::from(&self.0).as_bytes())
    }

    pub(crate) fn diffie_hellman(&self, peer: &PublicKey) -> SharedSecret {
        self.0.diffie_hellman(&peer.to_x25519())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A key pair whose public half is always derived from its private half.
#[derive(Clone, Debug)]
pub struct KeyPair {
    public: PublicKey,
    secret: SecretKey,
}

impl KeyPair {
    pub fn generate() -> Result<Self, CodecError> {
        SecretKey::generate().map(Self::from_secret)
    }

    pub fn from_secret(secret: SecretKey) -> Self {
        let public = secret.public_key();
        Self { public, secret }
    }

    /// Load a stored pair, checking that the public key belongs to the private key.
    pub fn from_hex(public_hex: &str, private_hex: &str) -> Result<Self, CodecError> {
        let claimed = PublicKey::from_hex(public_hex).map_err(CodecError::malformed("public key"))?;
        let secret =
            SecretKey::from_hex(private_hex).map_err(CodecError::malformed("private key"))?;
        let pair = Self::from_secret(secret);
        if !constant_time_eq_32(claimed.as_bytes(), pair.public.as_bytes()) {
            return Err(CodecError::KeyMismatch);
        }
        Ok(pair)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    pub fn to_hex(&self) -> KeyPairHex {
        KeyPairHex {
            public_key: self.public.to_hex(),
            private_key: self.secret.to_hex().to_string(),
        }
    }
}

/// Hex form of a key pair, as handed to storage.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairHex {
    pub public_key: String,
    pub private_key: String,
}

impl KeyPairHex {
    pub fn to_key_pair(&self) -> Result<KeyPair, CodecError> {
        KeyPair::from_hex(&self.public_key, &self.private_key)
    }
}

impl fmt::Debug for KeyPairHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairHex")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Drop for KeyPairHex {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}
