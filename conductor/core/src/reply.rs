//! Reply Decoder
//!
//! Turns one assistant payload into the ordered display items it produces.
//!
//! The payload is the structured object carried (string-encoded) inside the
//! endpoint's response envelope. Its fields map to items in a fixed order:
//!
//! | Field      | Item                                  | Revealed |
//! |------------|---------------------------------------|----------|
//! | `default`  | bot text                              | yes      |
//! | `initial`  | bot text, `-` stripped                | yes      |
//! | `products` | product list (only when non-empty)    | no       |
//! | `final`    | bot text, `-` stripped                | yes      |
//!
//! Decoding is pure. Envelopes or payloads that fail to parse never reach
//! this module; the backend reports them as [`ChatError::MalformedReply`].
//!
//! [`ChatError::MalformedReply`]: crate::backend::ChatError::MalformedReply

use serde::{Deserialize, Serialize};

use crate::transcript::{DisplayItem, Product};

/// A highlighted message (`initial` / `final`)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Message text, may contain `-` separators. Required: a highlight
    /// without one is a malformed payload.
    pub message: String,
}

impl Highlight {
    /// Create a highlight from its message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The structured assistant payload
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Plain assistant text
    #[serde(default)]
    pub default: Option<String>,
    /// Message shown before the products
    #[serde(default)]
    pub initial: Option<Highlight>,
    /// Product cards
    #[serde(default)]
    pub products: Option<Vec<Product>>,
    /// Message shown after the products
    #[serde(default, rename = "final")]
    pub final_: Option<Highlight>,
}

impl ChatReply {
    /// Parse the string-encoded payload carried by the envelope
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Decode a reply into display items in `default, initial, products, final`
/// order. Absent fields contribute nothing.
#[must_use]
pub fn decode_reply(reply: &ChatReply) -> Vec<DisplayItem> {
    let mut items = Vec::with_capacity(4);

    if let Some(text) = reply.default.as_deref().filter(|t| !t.is_empty()) {
        items.push(DisplayItem::revealing_bot(text));
    }

    if let Some(initial) = &reply.initial {
        items.push(DisplayItem::revealing_bot(strip_dashes(&initial.message)));
    }

    if let Some(products) = reply.products.as_ref().filter(|p| !p.is_empty()) {
        items.push(DisplayItem::products(products.clone()));
    }

    if let Some(final_) = &reply.final_ {
        items.push(DisplayItem::revealing_bot(strip_dashes(&final_.message)));
    }

    items
}

/// Remove every literal `-`
fn strip_dashes(message: &str) -> String {
    message.replace('-', "")
}
