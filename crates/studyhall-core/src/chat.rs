//! Encrypted peer chat.
//!
//! Messages are sealed with the signed-in user's key pair for the
//! recipient's published public key. The chat transport only ever sees the
//! hex ciphertext and the algorithm tag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use studyhall_crypto::{CodecError, Envelope, KeyPair, PeerBox, PublicKey, ALGORITHM};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::context::AppContext;
use crate::errors::ChatError;

/// Shown in place of a message that cannot be decrypted.
pub const UNDECRYPTABLE_PLACEHOLDER: &str = "Unable to display this message";

/// Where peers' public keys come from. Publishing them is someone else's job.
pub trait PeerDirectory: Send + Sync {
    fn public_key(&self, user_id: &str) -> Option<PublicKey>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryPeerDirectory {
    keys: HashMap<String, PublicKey>,
}

impl InMemoryPeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, user_id: impl Into<String>, key: PublicKey) {
        self.keys.insert(user_id.into(), key);
    }

    pub fn publish_hex(&mut self, user_id: impl Into<String>, key_hex: &str) -> Result<(), CodecError> {
        let key = PublicKey::from_hex(key_hex).map_err(|source| CodecError::MalformedInput {
            field: "peer public key",
            source,
        })?;
        self.publish(user_id, key);
        Ok(())
    }

    pub fn remove(&mut self, user_id: &str) -> Option<PublicKey> {
        self.keys.remove(user_id)
    }
}

impl PeerDirectory for InMemoryPeerDirectory {
    fn public_key(&self, user_id: &str) -> Option<PublicKey> {
        self.keys.get(user_id).copied()
    }
}

/// Payload handed to the chat API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingChatMessage {
    pub recipient_id: String,
    pub ciphertext: String,
    pub algorithm: String,
}

/// Payload received from the chat API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingChatMessage {
    pub sender_id: String,
    pub ciphertext: String,
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayedMessage {
    Text(String),
    Undecryptable,
}

impl DisplayedMessage {
    pub fn render(&self) -> &str {
        match self {
            DisplayedMessage::Text(text) => text,
            DisplayedMessage::Undecryptable => UNDECRYPTABLE_PLACEHOLDER,
        }
    }
}

/// Seals and opens chat messages for the signed-in user.
pub struct ChatCipher<'a, D: PeerDirectory + ?Sized> {
    key_pair: &'a KeyPair,
    directory: &'a D,
}

impl<'a, D: PeerDirectory + ?Sized> ChatCipher<'a, D> {
    pub fn new(ctx: &'a AppContext, directory: &'a D) -> Result<Self, ChatError> {
        let key_pair = ctx.require_key_pair()?;
        Ok(Self {
            key_pair,
            directory,
        })
    }

    fn peer_box(&self, peer_id: &str) -> Result<PeerBox, ChatError> {
        let peer = self
            .directory
            .public_key(peer_id)
            .ok_or_else(|| ChatError::UnknownPeer(peer_id.to_string()))?;
        Ok(PeerBox::new(self.key_pair.secret_key(), &peer)?)
    }

    pub fn encrypt_to(&self, recipient_id: &str, text: &str) -> Result<OutgoingChatMessage, ChatError> {
        let envelope = self.peer_box(recipient_id)?.seal(text.as_bytes())?;
        debug!(recipient_id, bytes = text.len(), "sealed chat message");
        Ok(OutgoingChatMessage {
            recipient_id: recipient_id.to_string(),
            ciphertext: envelope.to_hex(),
            algorithm: ALGORITHM.to_string(),
        })
    }

    /// Open an incoming message. Every failure renders as `Undecryptable`.
    pub fn decrypt(&self, message: &IncomingChatMessage) -> DisplayedMessage {
        match self.try_decrypt(message) {
            Ok(text) => DisplayedMessage::Text(text),
            Err(err) => {
                warn!(sender_id = %message.sender_id, error = %err, "cannot display chat message");
                DisplayedMessage::Undecryptable
            }
        }
    }

    fn try_decrypt(&self, message: &IncomingChatMessage) -> Result<String, ChatError> {
        if message.algorithm != ALGORITHM {
            return Err(ChatError::UnsupportedAlgorithm(message.algorithm.clone()));
        }
        let envelope = Envelope::from_hex(&message.ciphertext)?;
        let plaintext = self.peer_box(&message.sender_id)?.open(&envelope)?;
        String::from_utf8(plaintext).map_err(|e| {
            e.into_bytes().zeroize();
            ChatError::Codec(CodecError::DecryptionFailed)
        })
    }
}
