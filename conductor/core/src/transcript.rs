//! Transcript Store
//!
//! The ordered, append-only log of everything shown in the conversation.
//! An item's index never changes once assigned, which makes it the handle
//! the reveal engine uses to commit a finished reveal.
//!
//! # Lifecycle
//!
//! - User, products and error items are final the moment they are appended.
//! - Revealing bot items are appended with an empty placeholder text and
//!   become final exactly once, through [`Transcript::commit_text`].
//! - Nothing is ever removed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who (or what) produced a transcript item
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    /// Text typed by the user
    User,
    /// Assistant text
    Bot,
    /// A list of product cards
    Products,
    /// A failed exchange
    Error,
}

/// A product card returned by the assistant
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Product name
    pub title: String,
    /// Image URL
    pub image: String,
    /// Short description
    pub description: String,
    /// Link to the product page
    pub url: String,
}

/// Item payload; the sender decides which variant is used
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// User, bot and error items
    Text(String),
    /// Products items
    Products(Vec<Product>),
}

/// One transcript entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayItem {
    sender: Sender,
    content: Content,
    revealing: bool,
    finalized: bool,
}

impl DisplayItem {
    /// A message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::final_text(Sender::User, text.into())
    }

    /// Bot text that must be revealed word by word before it is final
    pub fn revealing_bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            content: Content::Text(text.into()),
            revealing: true,
            finalized: false,
        }
    }

    /// A product list; products are never revealed
    pub fn products(items: Vec<Product>) -> Self {
        Self {
            sender: Sender::Products,
            content: Content::Products(items),
            revealing: false,
            finalized: true,
        }
    }

    /// An error surfaced to the user
    pub fn error(text: impl Into<String>) -> Self {
        Self::final_text(Sender::Error, text.into())
    }

    fn final_text(sender: Sender, text: String) -> Self {
        Self {
            sender,
            content: Content::Text(text),
            revealing: false,
            finalized: true,
        }
    }

    /// Who produced this item
    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// The item payload
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Text of a user, bot or error item
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Products(_) => None,
        }
    }

    /// Products of a products item
    #[must_use]
    pub fn items(&self) -> Option<&[Product]> {
        match &self.content {
            Content::Products(items) => Some(items),
            Content::Text(_) => None,
        }
    }

    /// Whether this item animates in word by word
    #[must_use]
    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Whether the stored text is the final text
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.finalized
    }

    /// Swap the text of an unfinalized revealing item for an empty
    /// placeholder, returning the full text to animate.
    ///
    /// Returns `None` for every other kind of item.
    pub fn take_reveal_text(&mut self) -> Option<String> {
        if !self.revealing || self.finalized {
            return None;
        }
        match &mut self.content {
            Content::Text(text) => Some(std::mem::take(text)),
            Content::Products(_) => None,
        }
    }
}

/// Misuse of [`Transcript::commit_text`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// No item at this index
    #[error("no transcript item at index {index} (len {len})")]
    OutOfBounds {
        /// Requested index
        index: usize,
        /// Transcript length at the time of the call
        len: usize,
    },

    /// The item is not a revealing bot item
    #[error("transcript item {index} is not a revealing bot item")]
    NotRevealing {
        /// Requested index
        index: usize,
    },

    /// The item already holds its final text
    #[error("transcript item {index} was already committed")]
    AlreadyCommitted {
        /// Requested index
        index: usize,
    },
}

/// Ordered, append-only log of display items
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    items: Vec<DisplayItem>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items in order and return the index of the first one.
    ///
    /// Subsequent items get consecutive indices. Appending nothing returns
    /// the current length.
    pub fn append(&mut self, items: impl IntoIterator<Item = DisplayItem>) -> usize {
        let start = self.items.len();
        self.items.extend(items);
        start
    }

    /// Replace the placeholder of a revealing bot item with its final text
    pub fn commit_text(
        &mut self,
        index: usize,
        final_text: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(TranscriptError::OutOfBounds { index, len })?;

        if item.sender != Sender::Bot || !item.revealing {
            return Err(TranscriptError::NotRevealing { index });
        }
        if item.finalized {
            return Err(TranscriptError::AlreadyCommitted { index });
        }

        item.content = Content::Text(final_text.into());
        item.finalized = true;
        Ok(())
    }

    /// Item at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DisplayItem> {
        self.items.get(index)
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been appended yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in transcript order
    pub fn iter(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items.iter()
    }
}
