//! PickSmart Conductor - Headless Chat Core
//!
//! This crate holds everything the PickSmart chat client does apart from
//! drawing: submitting messages, decoding assistant replies, keeping the
//! transcript and revealing bot text word by word. It can drive the TUI or
//! run headless under test.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         UI Surface (TUI)                          │
//! │   input buffer ─► submit()      render ◄─ transcript()/active_reveal()
//! │   every frame  ─► poll_exchanges() + advance(frame delta)         │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────────┐
//! │                        CONDUCTOR CORE                             │
//! │  ┌────────────────────────────┴───────────────────────────────┐  │
//! │  │                        Conductor                            │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌─────────────────────┐ │  │
//! │  │  │  Session   │  │ RevealEngine │  │  ChatBackend (HTTP) │ │  │
//! │  │  │ Transcript │  │  + Cadence   │  │   reply decoding    │ │  │
//! │  │  └────────────┘  └──────────────┘  └─────────────────────┘ │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: submission controller, owns the session and backend
//! - [`Session`]: transcript, reveal engine, input buffer and busy count
//! - [`Transcript`]: append-only log of [`DisplayItem`]s
//! - [`RevealEngine`]: one-at-a-time word-by-word reveal state machine
//! - [`ChatReply`]: the structured assistant payload
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use picksmart_conductor::{load_config, Conductor, ConductorConfig, HttpChatBackend};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let backend = HttpChatBackend::from_config(&config.backend)?;
//!     let mut conductor = Conductor::new(backend, ConductorConfig::from(&config));
//!     conductor.start().await;
//!
//!     conductor.submit("red running shoes");
//!     loop {
//!         conductor.poll_exchanges();
//!         conductor.advance(Duration::from_millis(16));
//!         // render conductor.transcript() and conductor.active_reveal()
//!         tokio::time::sleep(Duration::from_millis(16)).await;
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: chat backend abstraction and the HTTP client
//! - [`conductor`]: main Conductor struct
//! - [`config`]: TOML/env configuration loading
//! - [`reply`]: reply payload and decoding into display items
//! - [`reveal`]: reveal queue, engine and cadence
//! - [`session`]: session state
//! - [`transcript`]: display items and the transcript log
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod conductor;
pub mod config;
pub mod reply;
pub mod reveal;
pub mod session;
pub mod transcript;

// Re-exports for convenience
pub use backend::{ChatBackend, ChatError, ChatRequest, HttpChatBackend};
pub use conductor::{Conductor, ConductorConfig, ExchangeId};
pub use reply::{decode_reply, ChatReply, Highlight};
pub use reveal::{
    ActiveReveal, Cadence, PendingReveal, RevealEngine, RevealQueue, RevealState, TickOutcome,
    DEFAULT_CADENCE,
};
pub use session::{Session, SettledExchange, DEFAULT_FALLBACK_ERROR};
pub use transcript::{Content, DisplayItem, Product, Sender, Transcript, TranscriptError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env,
    BackendSettings, ClientConfig, ClientToml, ConfigError, ConfigOverrides, ConfigSource,
};
