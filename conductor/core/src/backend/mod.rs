//! Chat Backend Integration
//!
//! Abstracted access to the assistant endpoint through a common trait.
//!
//! # Available Backends
//!
//! - **HTTP**: the PickSmart chat endpoint (default)
//!
//! # Usage
//!
//! ```ignore
//! use picksmart_conductor::backend::{ChatBackend, ChatRequest, HttpChatBackend};
//!
//! let backend = HttpChatBackend::from_config(&config.backend)?;
//! let reply = backend.send(&ChatRequest::new("user", "red shoes")).await?;
//! ```

mod http;
mod traits;

pub use http::HttpChatBackend;
pub use traits::{ChatBackend, ChatError, ChatRequest};
