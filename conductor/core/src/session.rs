//! Session State
//!
//! Everything a chat session mutates lives here: the transcript, the reveal
//! engine, the input buffer and the count of exchanges still waiting on the
//! backend. The methods on [`Session`] are the only mutators, so the
//! Idle/Revealing invariant and the transcript/queue correspondence are
//! enforced in one place.
//!
//! A session is in-memory only and is discarded when the client exits.

use std::time::Duration;

use crate::backend::ChatError;
use crate::reply::{decode_reply, ChatReply};
use crate::reveal::{ActiveReveal, Cadence, PendingReveal, RevealEngine, RevealState, TickOutcome};
use crate::transcript::{DisplayItem, Transcript};

/// Text used for failed exchanges that carry no message of their own
pub const DEFAULT_FALLBACK_ERROR: &str = "An error occurred.";

/// What settling one exchange added to the transcript
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettledExchange {
    /// Index of the first appended item
    pub start: usize,
    /// Number of appended items
    pub appended: usize,
    /// Transcript indices queued for reveal, in order
    pub reveals: Vec<usize>,
    /// Whether the exchange failed
    pub failed: bool,
}

/// A chat session
#[derive(Debug)]
pub struct Session {
    transcript: Transcript,
    reveals: RevealEngine,
    cadence: Cadence,
    input: String,
    pending_exchanges: usize,
    fallback_error: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Cadence::default(), DEFAULT_FALLBACK_ERROR)
    }
}

impl Session {
    /// Create a session revealing at `cadence`
    pub fn new(cadence: Cadence, fallback_error: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(),
            reveals: RevealEngine::new(),
            cadence,
            input: String::new(),
            pending_exchanges: 0,
            fallback_error: fallback_error.into(),
        }
    }

    /// The transcript
    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The reveal engine (read-only)
    #[must_use]
    pub fn reveals(&self) -> &RevealEngine {
        &self.reveals
    }

    /// The reveal in progress, if any
    #[must_use]
    pub fn active_reveal(&self) -> Option<&ActiveReveal> {
        self.reveals.active()
    }

    /// Reveal engine state
    #[must_use]
    pub fn reveal_state(&self) -> RevealState {
        self.reveals.state()
    }

    /// Whether any exchange is waiting on the backend
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.pending_exchanges > 0
    }

    /// Number of exchanges waiting on the backend
    #[must_use]
    pub fn pending_exchanges(&self) -> usize {
        self.pending_exchanges
    }

    /// Current input buffer
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Mutable input buffer for surface edits
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Record a user turn: append the user item, clear the input buffer and
    /// mark an exchange pending.
    ///
    /// Returns `false` without touching anything when `text` is blank.
    pub fn record_submission(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.transcript.append([DisplayItem::user(text)]);
        self.input.clear();
        self.pending_exchanges += 1;
        true
    }

    /// Apply the outcome of one exchange and release its busy hold
    pub fn settle_exchange(&mut self, result: Result<ChatReply, ChatError>) -> SettledExchange {
        let settled = match result {
            Ok(reply) => self.apply_reply(&reply),
            Err(e) => self.apply_failure(&e),
        };

        self.pending_exchanges = self.pending_exchanges.saturating_sub(1);
        settled
    }

    /// Decode a reply, append its items and queue the revealing ones
    fn apply_reply(&mut self, reply: &ChatReply) -> SettledExchange {
        let mut items = decode_reply(reply);
        let texts: Vec<Option<String>> = items.iter_mut().map(DisplayItem::take_reveal_text).collect();

        let appended = items.len();
        let start = self.transcript.append(items);

        let batch: Vec<PendingReveal> = texts
            .into_iter()
            .enumerate()
            .filter_map(|(offset, text)| text.map(|t| PendingReveal::new(start + offset, t)))
            .collect();
        let reveals: Vec<usize> = batch.iter().map(|p| p.index).collect();

        tracing::debug!(
            start,
            items = appended,
            reveals = reveals.len(),
            "Reply appended"
        );
        self.reveals.enqueue(batch, &mut self.transcript);

        SettledExchange {
            start,
            appended,
            reveals,
            failed: false,
        }
    }

    /// Append a single error item for a failed exchange
    fn apply_failure(&mut self, error: &ChatError) -> SettledExchange {
        let text = error
            .reported_message()
            .unwrap_or(&self.fallback_error)
            .to_string();
        tracing::warn!(error = %error, "Chat exchange failed");

        let start = self.transcript.append([DisplayItem::error(text)]);
        SettledExchange {
            start,
            appended: 1,
            reveals: Vec::new(),
            failed: true,
        }
    }

    /// Run one reveal tick
    pub fn tick(&mut self) -> TickOutcome {
        self.reveals.tick(&mut self.transcript)
    }

    /// Run every reveal tick due after `elapsed`; returns how many ran
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.reveals.is_idle() {
            self.cadence.reset();
            return 0;
        }

        let due = self.cadence.advance(elapsed);
        for _ in 0..due {
            self.tick();
        }
        due
    }
}
