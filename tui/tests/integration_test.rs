//! Integration Tests for TUI + Conductor
//!
//! These drive the `App` with synthetic key events against a mock backend
//! and render into ratatui's `TestBackend`, checking what actually lands on
//! screen.
//!
//! # Test Coverage
//!
//! 1. **Startup**: header shown before the first submit
//! 2. **Message Exchange**: typing, submit, typing indicator, reveal
//! 3. **Busy Gate**: Enter is ignored while a reply is pending
//! 4. **Errors**: failed exchanges render as error lines

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::Notify;

use picksmart_conductor::{ChatBackend, ChatError, ChatReply, ChatRequest, ConductorConfig};
use picksmart_tui::display::{HEADER_TITLE, TYPING_INDICATOR};
use picksmart_tui::{App, ConductorClient};

// ============================================================================
// Mock Backend
// ============================================================================

/// Replies with a fixed text, or fails, after an optional gate opens
#[derive(Default)]
struct MockBackend {
    reply: Option<String>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn send(&self, _request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reply {
            Some(text) => Ok(ChatReply {
                default: Some(text.clone()),
                ..Default::default()
            }),
            None => Err(ChatError::Status {
                status: 500,
                message: None,
            }),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn app_with(backend: MockBackend) -> App<MockBackend> {
    let config = ConductorConfig {
        cadence: Duration::from_millis(20),
        ..Default::default()
    };
    App::new(ConductorClient::with_backend(backend, config))
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App<MockBackend>, text: &str) {
    for c in text.chars() {
        app.handle_event(key(KeyCode::Char(c)));
    }
}

fn screen(app: &mut App<MockBackend>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();

    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Let spawned exchanges run, then apply them
async fn settle(app: &mut App<MockBackend>) {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    app.update_by(Duration::ZERO);
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_header_before_first_message() {
    let mut app = app_with(MockBackend::default());
    let screen = screen(&mut app);
    assert!(screen.contains(HEADER_TITLE));
    assert!(screen.contains("You: _"));
}

#[tokio::test]
async fn test_message_exchange_reveals_reply() {
    let mut app = app_with(MockBackend {
        reply: Some("Try the Trail Runner".to_string()),
        ..Default::default()
    });

    type_text(&mut app, "shoes");
    assert_eq!(app.conductor().input(), "shoes");
    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.conductor().input(), "");

    let before = screen(&mut app);
    assert!(before.contains("You: shoes"));
    assert!(before.contains(TYPING_INDICATOR));
    assert!(!before.contains(HEADER_TITLE));

    settle(&mut app).await;
    assert!(!app.conductor().is_busy());

    // Two ticks reveal "Try the"
    app.update_by(Duration::from_millis(40));
    let partial = screen(&mut app);
    assert!(partial.contains("PickSmart: Try the_"));
    assert!(!partial.contains(TYPING_INDICATOR));

    // Remaining two words plus the commit tick
    app.update_by(Duration::from_millis(60));
    let done = screen(&mut app);
    assert!(done.contains("PickSmart: Try the Trail Runner"));
    assert!(!done.contains("Runner_"));
}

#[tokio::test]
async fn test_enter_ignored_while_busy() {
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let mut app = app_with(MockBackend {
        reply: Some("ok".to_string()),
        gate: Some(Arc::clone(&gate)),
        calls: Arc::clone(&calls),
    });

    type_text(&mut app, "first");
    app.handle_event(key(KeyCode::Enter));
    type_text(&mut app, "second");
    app.handle_event(key(KeyCode::Enter));

    // Second submit refused; its text stays in the input buffer
    assert_eq!(app.conductor().input(), "second");
    assert_eq!(app.conductor().transcript().len(), 1);

    gate.notify_one();
    settle(&mut app).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!app.conductor().is_busy());

    app.handle_event(key(KeyCode::Enter));
    assert_eq!(app.conductor().transcript().len(), 3);
}

#[tokio::test]
async fn test_failure_renders_error_line() {
    let mut app = app_with(MockBackend::default());

    type_text(&mut app, "anything");
    app.handle_event(key(KeyCode::Enter));
    settle(&mut app).await;

    assert!(screen(&mut app).contains("Error: An error occurred."));
}

#[tokio::test]
async fn test_escape_quits() {
    let mut app = app_with(MockBackend::default());
    assert!(app.is_running());
    app.handle_event(key(KeyCode::Esc));
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_backspace_edits_input() {
    let mut app = app_with(MockBackend::default());
    type_text(&mut app, "shoez");
    app.handle_event(key(KeyCode::Backspace));
    type_text(&mut app, "s");
    assert_eq!(app.conductor().input(), "shoes");
}
