//! Study Hall peer encryption.
//!
//! Per-user X25519 key pairs and authenticated public-key encryption of short
//! chat messages for a single peer. Keys and envelopes travel as lowercase hex.
//!
//! ```rust
//! use studyhall_crypto::{decrypt_from_peer, encrypt_for_peer, generate_key_pair};
//!
//! let alice = generate_key_pair().unwrap();
//! let bob = generate_key_pair().unwrap();
//!
//! let msg = encrypt_for_peer("seat 14 is free", &bob.public_key, &alice.private_key).unwrap();
//! let text = decrypt_from_peer(&msg.ciphertext, &alice.public_key, &bob.private_key).unwrap();
//! assert_eq!(text, "seat 14 is free");
//! ```

#![forbid(unsafe_code)]

pub mod codec;
pub mod envelope;
pub mod error;
pub mod hex;
pub mod keys;
pub mod peer_box;

#[cfg(test)]
mod proptests;

pub use codec::{
    decrypt_from_peer, encrypt_for_peer, generate_key_pair, open_from_peer, EncryptedMessage,
};
pub use envelope::Envelope;
pub use error::{CodecError, HexError};
pub use keys::{KeyPair, KeyPairHex, PublicKey, SecretKey};
pub use peer_box::{PeerBox, ALGORITHM};
