//! Error types for the token console.

use thiserror::Error;

use crate::token::{TokenId, TokenKind};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never produced a usable HTTP response.
    Transport,
    /// The server answered and refused the request.
    ServerRejection,
    /// The server answered with data that failed validation.
    InvalidData,
    /// The request conflicts with local state (unknown id, pending revoke).
    Conflict,
    Configuration,
}

/// Primary error type for all token console operations.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Server rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid {kind} token record: {reason}")]
    InvalidRecord { kind: TokenKind, reason: String },

    #[error("Duplicate {kind} token id {id}")]
    DuplicateToken { kind: TokenKind, id: TokenId },

    #[error("Unknown {kind} token id {id}")]
    UnknownToken { kind: TokenKind, id: TokenId },

    #[error("Revocation already pending for {kind} token {id}")]
    RevokePending { kind: TokenKind, id: TokenId },

    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl ConsoleError {
    /// Create a rejection error from a server response.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_record(kind: TokenKind, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            kind,
            reason: reason.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::Io(_) => ErrorCategory::Transport,
            Self::Rejected { .. } => ErrorCategory::ServerRejection,
            Self::Serialization(_) | Self::InvalidRecord { .. } | Self::DuplicateToken { .. } => {
                ErrorCategory::InvalidData
            }
            Self::UnknownToken { .. } | Self::RevokePending { .. } => ErrorCategory::Conflict,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether re-issuing the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rejected { status, .. } => *status >= 500,
            other => other.category() == ErrorCategory::Transport,
        }
    }

    /// Text suitable for a user-facing alert.
    ///
    /// Server rejections surface the server's own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConsoleError>;
