//! Chat Backend Traits
//!
//! Trait definitions for the assistant endpoint. The conductor only sees
//! [`ChatBackend`], so the HTTP client can be swapped for a scripted one in
//! tests without touching the submission flow.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::reply::ChatReply;

/// One chat request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Fixed user identifier sent with every request
    pub user: String,
    /// The submitted text, exactly as entered
    pub message: String,
}

impl ChatRequest {
    /// Create a request
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
        }
    }
}

/// Why an exchange produced no reply
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection, timeout or body read failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("backend returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the response body, if it carried one
        message: Option<String>,
    },

    /// Envelope or payload was not the expected JSON
    #[error("malformed reply: {0}")]
    MalformedReply(#[from] serde_json::Error),

    /// The exchange task ended without producing a result
    #[error("exchange aborted: {0}")]
    Aborted(String),
}

impl ChatError {
    /// Message the backend itself reported, if any
    ///
    /// Only error responses can carry one.
    #[must_use]
    pub fn reported_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref().filter(|m| !m.is_empty()),
            Self::Transport(_) | Self::MalformedReply(_) | Self::Aborted(_) => None,
        }
    }
}

/// Chat backend trait
///
/// Implement this to talk to a different assistant endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Whether the backend answers at all
    async fn health_check(&self) -> bool;

    /// Send one message and wait for the decoded reply
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}
