//! Study Hall client core.
//!
//! This crate implements:
//! - The application context (session, chat key material, list filters)
//! - Notification categories and their display styles
//! - The notification read-state cache and mark-as-read flow
//! - Encrypted peer chat on top of `studyhall-crypto`

#![forbid(unsafe_code)]

pub mod chat;
pub mod context;
pub mod errors;
pub mod notifications;
pub mod read_state;

pub use chat::{ChatCipher, DisplayedMessage, InMemoryPeerDirectory, PeerDirectory};
pub use context::{AppContext, ListFilters, Role, Session};
pub use errors::{ApiError, ChatError, ContextError, NotificationError};
pub use notifications::{CategoryStyle, Notification, NotificationCategory};
pub use read_state::{InMemoryNotificationApi, MarkReadOutcome, NotificationApi, NotificationCenter};
