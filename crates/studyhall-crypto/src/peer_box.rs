//! Authenticated public-key box between two users.
//!
//! X25519 shared secret -> HKDF-SHA256 -> XChaCha20Poly1305 with a random
//! 24-byte nonce per message. The derived key is bound to both public keys
//! in sorted order, so sender and recipient derive the same key.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    Key, XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::envelope::Envelope;
use crate::error::CodecError;
use crate::keys::{PublicKey, SecretKey, KEY_LEN};

/// Algorithm tag carried next to every ciphertext. Fixed, not negotiated.
pub const ALGORITHM: &str = "x25519-xchacha20poly1305";

const KDF_LABEL: &[u8] = b"studyhall_peer_box_v1";

/// Precomputed box for one (own secret, peer public) pair.
pub struct PeerBox {
    key: Zeroizing<[u8; 32]>,
}

impl PeerBox {
    pub fn new(my_secret: &SecretKey, peer_public: &PublicKey) -> Result<Self, CodecError> {
        let shared = my_secret.diffie_hellman(peer_public);
        // All-zero output from a low-order point.
        if !shared.was_contributory() {
            return Err(CodecError::InvalidKey("peer public"));
        }

        let my_public = my_secret.public_key();
        let (lo, hi) = if my_public.as_bytes() <= peer_public.as_bytes() {
            (my_public, *peer_public)
        } else {
            (*peer_public, my_public)
        };

        let mut info = Vec::with_capacity(KDF_LABEL.len() + 2 * KEY_LEN);
        info.extend_from_slice(KDF_LABEL);
        info.extend_from_slice(lo.as_bytes());
        info.extend_from_slice(hi.as_bytes());

        let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
        let mut key = Zeroizing::new([0u8; 32]);
        hk.expand(&info, &mut key[..])
            .map_err(|_| CodecError::KeyDerivation)?;

        Ok(Self { key })
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.key[..]))
    }

    pub fn seal(&self, plaintext: &[u8]) -> Result<Envelope, CodecError> {
        let nonce = Envelope::fresh_nonce()?;
        let ciphertext = self
            .cipher()
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: ALGORITHM.as_bytes(),
                },
            )
            .map_err(|_| CodecError::EncryptionFailed)?;
        Ok(Envelope { nonce, ciphertext })
    }

    pub fn open(&self, envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
        self.cipher()
            .decrypt(
                XNonce::from_slice(&envelope.nonce),
                Payload {
                    msg: &envelope.ciphertext,
                    aad: ALGORITHM.as_bytes(),
                },
            )
            .map_err(|_| CodecError::DecryptionFailed)
    }
}
