//! Display Lines
//!
//! Turns the conductor's transcript into wrapped, tagged lines for the
//! conversation pane. Everything here is pure: no terminal, no styles, so
//! the layout rules can be tested directly.
//!
//! - User, bot and error items render as prefixed, wrapped text.
//! - The item under reveal shows the published prefix plus a cursor.
//! - Items still waiting in the reveal queue are not shown yet.
//! - Product lists render as cards: title, description, link and image.

use picksmart_conductor::{ActiveReveal, Content, DisplayItem, Product, Sender, Transcript};

/// Title shown above an empty conversation
pub const HEADER_TITLE: &str = "PickSmart: AI-Powered Product Search";

/// Subtitle shown above an empty conversation
pub const HEADER_HINT: &str = "Ask for a product, e.g. \"waterproof hiking boots under $100\"";

/// Shown while an exchange is in flight
pub const TYPING_INDICATOR: &str = "PickSmart is typing...";

/// Cursor appended to the text under reveal
pub const REVEAL_CURSOR: char = '_';

/// What a line represents; the theme picks a style from it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Header title
    Header,
    /// Header hint
    Hint,
    /// User text
    User,
    /// Bot text
    Bot,
    /// Product title
    ProductTitle,
    /// Product description
    ProductDetail,
    /// Product link or image URL
    ProductLink,
    /// Error text
    Error,
    /// Typing indicator
    Typing,
    /// Spacer between items
    Blank,
}

/// One wrapped conversation line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    /// Line text, already wrapped to width
    pub text: String,
    /// What the line represents
    pub kind: LineKind,
}

impl DisplayLine {
    fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), LineKind::Blank)
    }
}

/// Display role for transcript items
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// User input
    User,
    /// Assistant text
    Assistant,
    /// Product cards
    Products,
    /// Failed exchange
    Error,
}

impl From<Sender> for DisplayRole {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Self::User,
            Sender::Bot => Self::Assistant,
            Sender::Products => Self::Products,
            Sender::Error => Self::Error,
        }
    }
}

impl DisplayRole {
    /// Prefix shown before the item text
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::User => "You: ",
            Self::Assistant => "PickSmart: ",
            Self::Products => "",
            Self::Error => "Error: ",
        }
    }

    fn line_kind(self) -> LineKind {
        match self {
            Self::User => LineKind::User,
            Self::Assistant => LineKind::Bot,
            Self::Products => LineKind::ProductTitle,
            Self::Error => LineKind::Error,
        }
    }
}

/// Build the conversation pane's lines
///
/// `width` is the usable column count; it is clamped to at least 1.
pub fn build_transcript_lines(
    transcript: &Transcript,
    active: Option<&ActiveReveal>,
    busy: bool,
    width: usize,
) -> Vec<DisplayLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    if transcript.is_empty() && !busy {
        push_wrapped(&mut lines, HEADER_TITLE, LineKind::Header, width);
        push_wrapped(&mut lines, HEADER_HINT, LineKind::Hint, width);
        lines.push(DisplayLine::blank());
        return lines;
    }

    for (index, item) in transcript.iter().enumerate() {
        let role = DisplayRole::from(item.sender());
        match item.content() {
            Content::Products(products) => push_products(&mut lines, products, width),
            Content::Text(text) => {
                let Some(shown) = visible_text(index, item, text, active) else {
                    continue;
                };
                let content = format!("{}{}", role.prefix(), shown);
                push_wrapped(&mut lines, &content, role.line_kind(), width);
            }
        }
        lines.push(DisplayLine::blank());
    }

    if busy {
        push_wrapped(&mut lines, TYPING_INDICATOR, LineKind::Typing, width);
    }

    lines
}

/// Text to show for a text item, or `None` to hide it
fn visible_text(
    index: usize,
    item: &DisplayItem,
    stored: &str,
    active: Option<&ActiveReveal>,
) -> Option<String> {
    if !item.is_revealing() || item.is_final() {
        return Some(stored.to_string());
    }

    // Unfinalized revealing item: only the active one is visible
    active
        .filter(|a| a.index() == index)
        .map(|a| format!("{}{REVEAL_CURSOR}", a.visible_text()))
}

fn push_products(lines: &mut Vec<DisplayLine>, products: &[Product], width: usize) {
    let detail_width = width.saturating_sub(4).max(1);

    for (n, product) in products.iter().enumerate() {
        let title = if product.title.is_empty() {
            "(untitled)"
        } else {
            product.title.as_str()
        };
        push_wrapped(
            lines,
            &format!("{}. {title}", n + 1),
            LineKind::ProductTitle,
            width,
        );

        if !product.description.is_empty() {
            push_indented(lines, &product.description, LineKind::ProductDetail, detail_width);
        }
        if !product.url.is_empty() {
            push_indented(
                lines,
                &format!("Visit: {}", product.url),
                LineKind::ProductLink,
                detail_width,
            );
        }
        if !product.image.is_empty() {
            push_indented(
                lines,
                &format!("image: {}", product.image),
                LineKind::ProductLink,
                detail_width,
            );
        }
    }
}

fn push_wrapped(lines: &mut Vec<DisplayLine>, text: &str, kind: LineKind, width: usize) {
    for line in textwrap::wrap(text, width) {
        lines.push(DisplayLine::new(line.into_owned(), kind));
    }
}

fn push_indented(lines: &mut Vec<DisplayLine>, text: &str, kind: LineKind, width: usize) {
    for line in textwrap::wrap(text, width) {
        lines.push(DisplayLine::new(format!("    {line}"), kind));
    }
}
