//! HTTP Chat Backend
//!
//! Talks to the PickSmart assistant over HTTP.
//!
//! # Endpoint
//!
//! `POST {base_url}{endpoint}` with `{"user": ..., "message": ...}`.
//!
//! A successful response is an envelope whose `value` field holds the reply
//! payload as a JSON *string*:
//!
//! ```text
//! {"value": "{\"initial\": {\"message\": \"...\"}, \"products\": [...]}"}
//! ```
//!
//! Error responses may carry a message in `error` or, from FastAPI style
//! servers, in `detail`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::traits::{ChatBackend, ChatError, ChatRequest};
use crate::config::BackendSettings;
use crate::reply::ChatReply;

/// Success envelope
#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    value: String,
}

/// Error body, all fields optional
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or_else(|| {
            self.detail
                .and_then(|d| d.as_str().map(ToString::to_string))
        })
    }
}

/// HTTP chat backend client
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    /// Base URL, without trailing slash
    base_url: String,
    /// Chat endpoint path
    endpoint: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for `base_url` + `endpoint`
    pub fn new(
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        let endpoint = endpoint.into();
        let endpoint = if endpoint.starts_with('/') {
            endpoint
        } else {
            format!("/{endpoint}")
        };

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint,
            http_client,
        })
    }

    /// Create from resolved backend settings
    pub fn from_config(settings: &BackendSettings) -> Result<Self, ChatError> {
        Self::new(
            settings.url.clone(),
            settings.endpoint.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full chat URL
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "PickSmart HTTP"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(&self.base_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let url = self.chat_url();
        tracing::debug!(url = %url, chars = request.message.len(), "Sending chat request");

        let response = self.http_client.post(&url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::message);
            tracing::warn!(status = status.as_u16(), message = ?message, "Chat request rejected");
            return Err(ChatError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ReplyEnvelope = serde_json::from_str(&body)?;
        let reply = ChatReply::from_json(&envelope.value)?;
        Ok(reply)
    }
}
