//! Error types for the Study Hall client core.

use studyhall_crypto::CodecError;
use thiserror::Error;

/// Application context errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("not signed in")]
    NotSignedIn,

    #[error("already signed in as {0}; sign out first")]
    AlreadySignedIn(String),

    #[error("no chat key material for the current session")]
    NoKeyMaterial,
}

/// Failures reported by the notification backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("server responded with status {0}")]
    Status(u16),

    #[error("notification not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Whether repeating the same request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(_) => true,
            ApiError::Status(code) => *code == 429 || *code >= 500,
            ApiError::NotFound(_) => false,
        }
    }
}

/// Notification center errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("unknown notification: {0}")]
    NotFound(String),

    #[error("failed to load notifications: {source}")]
    FetchFailed {
        retryable: bool,
        #[source]
        source: ApiError,
    },

    #[error("failed to mark {id} as read: {source}")]
    MutationFailed {
        id: String,
        retryable: bool,
        #[source]
        source: ApiError,
    },
}

impl NotificationError {
    /// True when the UI should offer a retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotificationError::NotFound(_) => false,
            NotificationError::FetchFailed { retryable, .. }
            | NotificationError::MutationFailed { retryable, .. } => *retryable,
        }
    }
}

/// Peer chat errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("no public key published for {0}")]
    UnknownPeer(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_retry_classification() {
        assert!(ApiError::Request("connection reset".into()).is_retryable());
        assert!(ApiError::Status(503).is_retryable());
        assert!(ApiError::Status(429).is_retryable());
        assert!(!ApiError::Status(403).is_retryable());
        assert!(!ApiError::NotFound("n1".into()).is_retryable());
    }

    #[test]
    fn test_notification_error_retryable() {
        let err = NotificationError::MutationFailed {
            id: "n1".into(),
            retryable: true,
            source: ApiError::Status(502),
        };
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "failed to mark n1 as read: server responded with status 502"
        );
        assert!(!NotificationError::NotFound("n2".into()).is_retryable());
    }
}
