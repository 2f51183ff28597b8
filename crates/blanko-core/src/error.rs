//! Error types for the blanko engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::ConversationId;

/// A shared error type for the entire blanko application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BlankoError {
    /// A callback payload could not be decoded into a menu or fill token
    #[error("Malformed callback token: '{token}'")]
    MalformedToken { token: String },

    /// Category absent from the menu tree
    #[error("Unknown category: '{category}'")]
    UnknownCategory { category: String },

    /// Document absent from the field-chain registry or the menu tree
    #[error("Unknown document: '{document}'")]
    UnknownDocument { document: String },

    /// Menu token carried a depth level the navigation cannot render
    #[error("Unknown menu level: {level}")]
    UnknownLevel { level: u8 },

    /// A fill dialogue is already in progress for this conversation
    #[error("Fill already in progress for conversation {conversation}")]
    SessionAlreadyActive { conversation: ConversationId },

    /// Localization key absent from the lexicon
    #[error("Missing translation for key '{key}'")]
    MissingTranslation { key: String },

    /// Template rendering or typesetting failed
    #[error("Render failure: {0}")]
    RenderFailure(String),

    /// A send/edit call to the chat transport failed
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BlankoError {
    /// Creates a MalformedToken error
    pub fn malformed_token(token: impl Into<String>) -> Self {
        Self::MalformedToken {
            token: token.into(),
        }
    }

    /// Creates an UnknownCategory error
    pub fn unknown_category(category: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
        }
    }

    /// Creates an UnknownDocument error
    pub fn unknown_document(document: impl Into<String>) -> Self {
        Self::UnknownDocument {
            document: document.into(),
        }
    }

    /// Creates a MissingTranslation error
    pub fn missing_translation(key: impl Into<String>) -> Self {
        Self::MissingTranslation { key: key.into() }
    }

    /// Creates a RenderFailure error
    pub fn render(message: impl Into<String>) -> Self {
        Self::RenderFailure(message.into())
    }

    /// Creates a TransportFailure error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a SessionAlreadyActive error
    pub fn is_session_already_active(&self) -> bool {
        matches!(self, Self::SessionAlreadyActive { .. })
    }

    /// Check if this is a TransportFailure error
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::TransportFailure(_))
    }

    /// Check if this is a RenderFailure error
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::RenderFailure(_))
    }

    /// Check if this error should be surfaced to the user as a generic
    /// "try again" notice rather than propagated.
    ///
    /// Covers lookup and codec errors raised while handling a navigation
    /// action; transport and internal errors are excluded.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken { .. }
                | Self::UnknownCategory { .. }
                | Self::UnknownDocument { .. }
                | Self::UnknownLevel { .. }
                | Self::MissingTranslation { .. }
        )
    }
}

impl From<std::io::Error> for BlankoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BlankoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BlankoError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, BlankoError>`.
pub type Result<T> = std::result::Result<T, BlankoError>;
