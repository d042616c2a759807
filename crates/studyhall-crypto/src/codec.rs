//! Hex-string entry points used by the chat client.
//!
//! Keys and ciphertexts cross this boundary as lowercase hex. All hex is
//! validated before any cryptography runs, so malformed input is reported as
//! [`CodecError::MalformedInput`] rather than masquerading as a failed
//! decryption.

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::envelope::Envelope;
use crate::error::CodecError;
use crate::keys::{KeyPair, KeyPairHex, PublicKey, SecretKey};
use crate::peer_box::{PeerBox, ALGORITHM};

/// Ciphertext plus the tag naming the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub ciphertext: String,
    pub algorithm: String,
}

/// Generate a key pair and return both halves as lowercase hex.
pub fn generate_key_pair() -> Result<KeyPairHex, CodecError> {
    Ok(KeyPair::generate()?.to_hex())
}

/// Encrypt `text` for the holder of `peer_public_key_hex`.
pub fn encrypt_for_peer(
    text: &str,
    peer_public_key_hex: &str,
    my_private_key_hex: &str,
) -> Result<EncryptedMessage, CodecError> {
    let (peer, mine) = parse_keys(peer_public_key_hex, my_private_key_hex)?;
    let envelope = PeerBox::new(&mine, &peer)?.seal(text.as_bytes())?;
    Ok(EncryptedMessage {
        ciphertext: envelope.to_hex(),
        algorithm: ALGORITHM.to_string(),
    })
}

/// Decrypt an envelope produced by [`encrypt_for_peer`].
///
/// `peer_public_key_hex` is the sender's public key. Returns
/// [`CodecError::DecryptionFailed`] for every authentication failure; no
/// partial plaintext is ever returned.
pub fn decrypt_from_peer(
    ciphertext_hex: &str,
    peer_public_key_hex: &str,
    my_private_key_hex: &str,
) -> Result<String, CodecError> {
    let (peer, mine) = parse_keys(peer_public_key_hex, my_private_key_hex)?;
    let envelope = Envelope::from_hex(ciphertext_hex)?;
    let plaintext = PeerBox::new(&mine, &peer)?.open(&envelope)?;
    String::from_utf8(plaintext).map_err(|e| {
        e.into_bytes().zeroize();
        CodecError::DecryptionFailed
    })
}

/// [`decrypt_from_peer`] collapsed to "text or nothing".
pub fn open_from_peer(
    ciphertext_hex: &str,
    peer_public_key_hex: &str,
    my_private_key_hex: &str,
) -> Option<String> {
    decrypt_from_peer(ciphertext_hex, peer_public_key_hex, my_private_key_hex).ok()
}

fn parse_keys(
    peer_public_key_hex: &str,
    my_private_key_hex: &str,
) -> Result<(PublicKey, SecretKey), CodecError> {
    let peer = PublicKey::from_hex(peer_public_key_hex)
        .map_err(CodecError::malformed("peer public key"))?;
    let mine = SecretKey::from_hex(my_private_key_hex)
        .map_err(CodecError::malformed("private key"))?;
    Ok((peer, mine))
}
