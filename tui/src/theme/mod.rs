//! Theme and Colors
//!
//! The PickSmart palette: a teal brand accent, green for the user and warm
//! tones for product cards.

use ratatui::style::{Color, Modifier, Style};

use crate::display::LineKind;

// ============================================================================
// Brand Palette
// ============================================================================

/// PickSmart's signature teal (header, bot text)
pub const PICKSMART_TEAL: Color = Color::Rgb(64, 200, 190);

/// Product titles - warm amber
pub const PRODUCT_AMBER: Color = Color::Rgb(255, 196, 92);

/// Product links - soft blue
pub const LINK_BLUE: Color = Color::Rgb(110, 170, 255);

// ============================================================================
// UI Colors
// ============================================================================

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Style for a conversation line
pub fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Header => Style::default()
            .fg(PICKSMART_TEAL)
            .add_modifier(Modifier::BOLD),
        LineKind::Hint | LineKind::Typing => Style::default()
            .fg(DIM_GRAY)
            .add_modifier(Modifier::ITALIC),
        LineKind::User => Style::default().fg(USER_GREEN),
        LineKind::Bot => Style::default().fg(PICKSMART_TEAL),
        LineKind::ProductTitle => Style::default()
            .fg(PRODUCT_AMBER)
            .add_modifier(Modifier::BOLD),
        LineKind::ProductDetail => Style::default(),
        LineKind::ProductLink => Style::default()
            .fg(LINK_BLUE)
            .add_modifier(Modifier::UNDERLINED),
        LineKind::Error => Style::default().fg(ERROR_RED),
        LineKind::Blank => Style::default(),
    }
}
