//! PickSmart TUI - Terminal chat client for PickSmart
//!
//! A full-screen terminal surface over the headless conductor: type a
//! product question, watch the answer type itself in word by word, browse
//! the product cards.
//!
//! # Architecture
//!
//! - **App**: event loop and rendering
//! - **ConductorClient**: embedded conductor plus surface-side rules
//! - **Display**: pure transcript-to-lines layout
//! - **Theme**: colors and line styles

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;

pub use app::App;
pub use conductor_client::ConductorClient;
