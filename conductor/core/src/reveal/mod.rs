//! Sequenced Message Reveal
//!
//! Bot messages "type" themselves into the transcript one word at a time,
//! strictly one message at a time, in the order they were queued.
//!
//! # Architecture
//!
//! ```text
//!  decoded reply ──► enqueue(batch) ──► RevealQueue (FIFO, no duplicates)
//!                                           │
//!                                    dispatch head when Idle
//!                                           ▼
//!                     ┌──────────── RevealEngine ────────────┐
//!                     │  Idle ◄──────────────────┐           │
//!                     │   │ dispatch              │ commit    │
//!                     │   ▼                       │           │
//!                     │  Revealing ── tick ×(W+1) ┘           │
//!                     └───────────────────────────────────────┘
//!                                           │
//!                              Transcript::commit_text(index, text)
//! ```
//!
//! The engine never owns a timer. Whoever drives it calls
//! [`RevealEngine::tick`] once per cadence period; [`Cadence`] turns elapsed
//! frame time into the number of ticks that are due.

mod cadence;
mod engine;

pub use cadence::{Cadence, DEFAULT_CADENCE};
pub use engine::{ActiveReveal, RevealEngine, RevealState, TickOutcome};

use std::collections::VecDeque;

/// A transcript item waiting to be revealed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingReveal {
    /// Transcript index of the placeholder item
    pub index: usize,
    /// Full text to reveal
    pub text: String,
}

impl PendingReveal {
    /// Create a pending reveal
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// FIFO of pending reveals
///
/// Entries leave only through [`RevealQueue::pop`], in insertion order.
#[derive(Clone, Debug, Default)]
pub struct RevealQueue {
    pending: VecDeque<PendingReveal>,
}

impl RevealQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push to the tail. Returns `false` (and leaves the queue untouched)
    /// when the index is already queued.
    pub fn push(&mut self, reveal: PendingReveal) -> bool {
        if self.contains(reveal.index) {
            return false;
        }
        self.pending.push_back(reveal);
        true
    }

    /// Remove and return the head
    pub fn pop(&mut self) -> Option<PendingReveal> {
        self.pending.pop_front()
    }

    /// Whether `index` is waiting in the queue
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.pending.iter().any(|p| p.index == index)
    }

    /// Number of queued reveals
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queued transcript indices, head first
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().map(|p| p.index)
    }
}
