//! Conductor - The Submission Controller
//!
//! The Conductor accepts user submissions, runs each one as a background
//! exchange against the [`ChatBackend`], and folds finished exchanges back
//! into the [`Session`]. It also drives the reveal engine from elapsed time.
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. A surface calls [`Conductor::submit`],
//! then on every frame calls [`Conductor::poll_exchanges`] and
//! [`Conductor::advance`] and renders from the read-only accessors. Tests do
//! the same, or await [`Conductor::next_exchange`] and call
//! [`Conductor::tick`] directly.
//!
//! ```text
//!  submit(text) ──► Session::record_submission ──► tokio::spawn(backend.send)
//!                                                          │
//!                                       ExchangeOutcome (unbounded channel)
//!                                                          ▼
//!  poll_exchanges / next_exchange ──► Session::settle_exchange ──► RevealEngine
//! ```
//!
//! Exchanges overlap freely; their replies are appended in completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::{ChatBackend, ChatError, ChatRequest};
use crate::config::ClientConfig;
use crate::reply::ChatReply;
use crate::reveal::{ActiveReveal, Cadence, RevealState, TickOutcome, DEFAULT_CADENCE};
use crate::session::{Session, SettledExchange, DEFAULT_FALLBACK_ERROR};
use crate::transcript::Transcript;

/// Conductor configuration
#[derive(Clone, Debug)]
pub struct ConductorConfig {
    /// User identifier sent with every request
    pub user: String,
    /// Time between revealed words
    pub cadence: Duration,
    /// Text shown for failures that carry no message
    pub fallback_error: String,
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            user: "user".to_string(),
            cadence: DEFAULT_CADENCE,
            fallback_error: DEFAULT_FALLBACK_ERROR.to_string(),
        }
    }
}

impl From<&ClientConfig> for ConductorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            user: config.backend.user.clone(),
            cadence: config.cadence(),
            fallback_error: config.fallback_error.clone(),
        }
    }
}

/// Identifier of one exchange
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(pub u64);

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exchange-{}", self.0)
    }
}

/// A finished exchange waiting to be applied
#[derive(Debug)]
struct ExchangeOutcome {
    id: ExchangeId,
    result: Result<ChatReply, ChatError>,
}

/// The Conductor - headless submission controller
pub struct Conductor<B: ChatBackend> {
    /// Configuration
    config: ConductorConfig,
    /// Chat backend
    backend: Arc<B>,
    /// Current session
    session: Session,
    /// Sender handed to exchange tasks
    outcome_tx: mpsc::UnboundedSender<ExchangeOutcome>,
    /// Finished exchanges
    outcome_rx: mpsc::UnboundedReceiver<ExchangeOutcome>,
    /// Next exchange number
    next_exchange: u64,
    /// Result of the last health check, if one ran
    backend_available: Option<bool>,
}

impl<B: ChatBackend + 'static> Conductor<B> {
    /// Create a new Conductor with the given backend
    pub fn new(backend: B, config: ConductorConfig) -> Self {
        let session = Session::new(Cadence::new(config.cadence), config.fallback_error.clone());
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            config,
            backend: Arc::new(backend),
            session,
            outcome_tx,
            outcome_rx,
            next_exchange: 0,
            backend_available: None,
        }
    }

    /// Get the session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get the transcript
    pub fn transcript(&self) -> &Transcript {
        self.session.transcript()
    }

    /// Get the reveal in progress
    pub fn active_reveal(&self) -> Option<&ActiveReveal> {
        self.session.active_reveal()
    }

    /// Get the reveal engine state
    pub fn reveal_state(&self) -> RevealState {
        self.session.reveal_state()
    }

    /// Whether any exchange is in flight
    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Current input buffer
    pub fn input(&self) -> &str {
        self.session.input()
    }

    /// Mutable input buffer
    pub fn input_mut(&mut self) -> &mut String {
        self.session.input_mut()
    }

    /// Result of the startup health check; `None` before [`Self::start`]
    pub fn backend_available(&self) -> Option<bool> {
        self.backend_available
    }

    /// Start the Conductor: check that the backend answers
    ///
    /// An unreachable backend is logged, not fatal; submissions will fail
    /// individually.
    pub async fn start(&mut self) -> bool {
        let available = self.backend.health_check().await;
        if available {
            tracing::info!(backend = %self.backend.name(), "Backend reachable");
        } else {
            tracing::warn!(
                backend = %self.backend.name(),
                "Backend not reachable - submissions may fail"
            );
        }
        self.backend_available = Some(available);
        available
    }

    /// Submit `text` as a user turn
    ///
    /// Blank text is ignored and returns `None`. Otherwise the user item is
    /// appended, the input buffer cleared and the exchange started in the
    /// background. Must be called from within a Tokio runtime.
    pub fn submit(&mut self, text: &str) -> Option<ExchangeId> {
        if !self.session.record_submission(text) {
            return None;
        }

        let id = ExchangeId(self.next_exchange);
        self.next_exchange += 1;

        let request = ChatRequest::new(self.config.user.clone(), text);
        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();

        tracing::debug!(exchange = %id, "Starting exchange");
        let exchange = tokio::spawn(async move { backend.send(&request).await });
        tokio::spawn(async move {
            // A panicking backend still has to release its busy hold
            let result = match exchange.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(exchange = %id, error = %e, "Exchange task failed");
                    Err(ChatError::Aborted(e.to_string()))
                }
            };
            if tx.send(ExchangeOutcome { id, result }).is_err() {
                tracing::debug!(exchange = %id, "Conductor gone, dropping exchange outcome");
            }
        });

        Some(id)
    }

    /// Submit the current input buffer
    pub fn submit_input(&mut self) -> Option<ExchangeId> {
        let text = self.session.input().to_string();
        self.submit(&text)
    }

    /// Apply every exchange that has already finished
    ///
    /// Returns the number applied. Never blocks.
    pub fn poll_exchanges(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.settle(outcome);
            applied += 1;
        }
        applied
    }

    /// Wait for the next exchange to finish and apply it
    ///
    /// Returns `None` at once when nothing is in flight.
    pub async fn next_exchange(&mut self) -> Option<(ExchangeId, SettledExchange)> {
        if !self.session.is_busy() {
            return None;
        }

        let outcome = self.outcome_rx.recv().await?;
        let id = outcome.id;
        Some((id, self.settle(outcome)))
    }

    fn settle(&mut self, outcome: ExchangeOutcome) -> SettledExchange {
        let settled = self.session.settle_exchange(outcome.result);
        tracing::info!(
            exchange = %outcome.id,
            items = settled.appended,
            reveals = settled.reveals.len(),
            failed = settled.failed,
            "Exchange settled"
        );
        settled
    }

    /// Run one reveal tick
    pub fn tick(&mut self) -> TickOutcome {
        self.session.tick()
    }

    /// Run every reveal tick due after `elapsed`
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.session.advance(elapsed)
    }
}
