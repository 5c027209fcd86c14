//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! The Conductor is embedded directly; the client adds the surface-side
//! rules (no submit while busy) and nothing else.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! Its job is:
//! 1. Edit the input buffer and submit it
//! 2. Poll finished exchanges and advance the reveal every frame
//! 3. Render the transcript and the active reveal

use std::time::Duration;

use picksmart_conductor::{
    ActiveReveal, ChatBackend, ClientConfig, Conductor, ConductorConfig, ExchangeId,
    HttpChatBackend, RevealState, Transcript,
};

/// Client for driving the embedded Conductor
pub struct ConductorClient<B: ChatBackend = HttpChatBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
}

impl ConductorClient<HttpChatBackend> {
    /// Create a client talking HTTP to the configured backend
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let backend = HttpChatBackend::from_config(&config.backend)?;
        tracing::info!(url = %backend.chat_url(), "Using chat backend");
        Ok(Self::with_backend(backend, ConductorConfig::from(config)))
    }
}

impl<B: ChatBackend + 'static> ConductorClient<B> {
    /// Create a client around any backend
    pub fn with_backend(backend: B, config: ConductorConfig) -> Self {
        Self {
            conductor: Conductor::new(backend, config),
        }
    }

    /// Check the backend once at startup
    pub async fn start(&mut self) -> bool {
        self.conductor.start().await
    }

    /// Submit the input buffer
    ///
    /// Refused while an exchange is in flight or when the buffer is blank.
    pub fn submit_input(&mut self) -> Option<ExchangeId> {
        if self.conductor.is_busy() {
            tracing::debug!("Submit refused while busy");
            return None;
        }
        self.conductor.submit_input()
    }

    /// Apply finished exchanges and advance the reveal by `delta`
    ///
    /// Returns true if anything changed.
    pub fn update(&mut self, delta: Duration) -> bool {
        let settled = self.conductor.poll_exchanges();
        let ticks = self.conductor.advance(delta);
        settled > 0 || ticks > 0
    }

    /// Transcript to render
    pub fn transcript(&self) -> &Transcript {
        self.conductor.transcript()
    }

    /// Reveal in progress
    pub fn active_reveal(&self) -> Option<&ActiveReveal> {
        self.conductor.active_reveal()
    }

    /// Reveal engine state
    pub fn reveal_state(&self) -> RevealState {
        self.conductor.reveal_state()
    }

    /// Whether an exchange is in flight
    pub fn is_busy(&self) -> bool {
        self.conductor.is_busy()
    }

    /// Startup health check result
    pub fn backend_available(&self) -> Option<bool> {
        self.conductor.backend_available()
    }

    /// Current input buffer
    pub fn input(&self) -> &str {
        self.conductor.input()
    }

    /// Append a character to the input buffer
    pub fn push_char(&mut self, c: char) {
        self.conductor.input_mut().push(c);
    }

    /// Remove the last character of the input buffer
    pub fn pop_char(&mut self) {
        self.conductor.input_mut().pop();
    }
}
