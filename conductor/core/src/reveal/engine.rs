//! Reveal Engine
//!
//! Two states, one active reveal at most:
//!
//! - **Idle**: nothing is being revealed. Entering Idle dispatches the queue
//!   head if there is one.
//! - **Revealing**: each tick reveals one more word. The tick after the last
//!   word commits the full text into the transcript and returns to Idle.
//!
//! Every transition happens inside [`RevealEngine::enqueue`] or
//! [`RevealEngine::tick`], so callers always observe a consistent state.

use crate::transcript::Transcript;

use super::{PendingReveal, RevealQueue};

/// Engine state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    /// No active reveal
    Idle,
    /// One reveal in progress
    Revealing,
}

impl RevealState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Revealing => "Typing...",
        }
    }
}

/// What a single tick did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to reveal
    Idle,
    /// One more word of `index` is visible
    Revealed {
        /// Transcript index being revealed
        index: usize,
        /// Words visible after this tick
        words: usize,
    },
    /// The reveal of `index` finished and its text was committed
    Committed {
        /// Transcript index that became final
        index: usize,
    },
}

/// The reveal currently in progress
#[derive(Clone, Debug)]
pub struct ActiveReveal {
    index: usize,
    full_text: String,
    words: Vec<String>,
    revealed: usize,
    visible: String,
}

impl ActiveReveal {
    fn new(pending: PendingReveal) -> Self {
        let words = pending
            .text
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self {
            index: pending.index,
            full_text: pending.text,
            words,
            revealed: 0,
            visible: String::new(),
        }
    }

    /// Transcript index being revealed
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text that will be committed on completion
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Number of words revealed so far
    #[must_use]
    pub fn revealed_words(&self) -> usize {
        self.revealed
    }

    /// Number of whitespace-delimited words in the full text
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// The published prefix: revealed words joined by single spaces
    #[must_use]
    pub fn visible_text(&self) -> &str {
        &self.visible
    }

    /// Reveal one more word. Returns `false` once the count has passed the
    /// last word, meaning the reveal is due for commit.
    fn advance(&mut self) -> bool {
        self.revealed += 1;
        if self.revealed > self.words.len() {
            return false;
        }
        let word = &self.words[self.revealed - 1];
        if !self.visible.is_empty() {
            self.visible.push(' ');
        }
        self.visible.push_str(word);
        true
    }
}

/// Serializes word-by-word reveals over a [`Transcript`]
#[derive(Clone, Debug, Default)]
pub struct RevealEngine {
    queue: RevealQueue,
    active: Option<ActiveReveal>,
    completed: u64,
}

impl RevealEngine {
    /// Create an idle engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> RevealState {
        if self.active.is_some() {
            RevealState::Revealing
        } else {
            RevealState::Idle
        }
    }

    /// Whether no reveal is active
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// The reveal in progress, if any
    #[must_use]
    pub fn active(&self) -> Option<&ActiveReveal> {
        self.active.as_ref()
    }

    /// Reveals waiting behind the active one
    #[must_use]
    pub fn queue(&self) -> &RevealQueue {
        &self.queue
    }

    /// Total reveals committed since creation
    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Queue a batch in order and start revealing if idle.
    ///
    /// Returns how many entries were accepted; entries whose index is
    /// already active or queued are dropped.
    pub fn enqueue(
        &mut self,
        batch: impl IntoIterator<Item = PendingReveal>,
        transcript: &mut Transcript,
    ) -> usize {
        let mut accepted = 0;
        for pending in batch {
            let index = pending.index;
            if self.active.as_ref().is_some_and(|a| a.index == index) || !self.queue.push(pending)
            {
                tracing::warn!(index, "Dropping duplicate reveal");
                continue;
            }
            accepted += 1;
        }

        if self.active.is_none() {
            self.dispatch_next(transcript);
        }
        accepted
    }

    /// Advance the active reveal by one cadence period
    pub fn tick(&mut self, transcript: &mut Transcript) -> TickOutcome {
        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Idle;
        };

        if active.advance() {
            return TickOutcome::Revealed {
                index: active.index,
                words: active.revealed,
            };
        }

        let index = active.index;
        self.complete(transcript);
        self.dispatch_next(transcript);
        TickOutcome::Committed { index }
    }

    /// Idle-entry action: dispatch queue heads until one needs ticks or the
    /// queue runs dry. Texts without words commit on the spot.
    fn dispatch_next(&mut self, transcript: &mut Transcript) {
        while self.active.is_none() {
            let Some(pending) = self.queue.pop() else {
                return;
            };

            let active = ActiveReveal::new(pending);
            tracing::debug!(
                index = active.index,
                words = active.word_count(),
                queued = self.queue.len(),
                "Reveal started"
            );
            let empty = active.words.is_empty();
            self.active = Some(active);
            if empty {
                self.complete(transcript);
            }
        }
    }

    /// Commit the active reveal and go Idle
    fn complete(&mut self, transcript: &mut Transcript) {
        let Some(active) = self.active.take() else {
            return;
        };

        match transcript.commit_text(active.index, active.full_text) {
            Ok(()) => {
                self.completed += 1;
                tracing::debug!(index = active.index, "Reveal committed");
            }
            Err(e) => {
                tracing::error!(index = active.index, error = %e, "Reveal commit rejected");
            }
        }
    }
}
