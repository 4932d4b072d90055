//! Error types for event handlers.

use thiserror::Error;

/// Error returned by a handler during dispatch.
///
/// The emitter never constructs one of these itself: whatever a handler
/// returns is handed back to the caller of `emit` untouched.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Shorthand for a plain message error.
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }
}

/// Result type for handlers and dispatch.
pub type Result<T> = std::result::Result<T, HandlerError>;
