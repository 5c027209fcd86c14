//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for submissions and the reveal
//! - Rendering of the conversation, input box and status bar
//!
//! Each frame the App applies finished exchanges, advances the reveal by the
//! real time elapsed since the previous frame, then redraws.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::{Frame, Terminal};

use picksmart_conductor::{ChatBackend, HttpChatBackend, RevealState};

use crate::conductor_client::ConductorClient;
use crate::display::build_transcript_lines;
use crate::theme::{line_style, DIM_GRAY, ERROR_RED, PICKSMART_TEAL, USER_GREEN};

/// Input box height (lines), separator included
const INPUT_HEIGHT: u16 = 4;

/// Frame interval for the render loop
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Upper bound on the startup health check
const STARTUP_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Lines scrolled per mouse wheel step
const WHEEL_STEP: usize = 3;

/// Main application state
pub struct App<B: ChatBackend = HttpChatBackend> {
    /// Is the app still running?
    running: bool,
    /// Client for the embedded Conductor
    conductor: ConductorClient<B>,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,
    /// Conversation pane height from the last draw
    page_height: usize,
    /// Last frame time
    last_frame: Instant,
}

impl<B: ChatBackend + 'static> App<B> {
    /// Create a new App around a conductor client
    pub fn new(conductor: ConductorClient<B>) -> Self {
        Self {
            running: true,
            conductor,
            scroll_offset: 0,
            total_lines: 0,
            page_height: 0,
            last_frame: Instant::now(),
        }
    }

    /// Whether the event loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The conductor client
    pub fn conductor(&self) -> &ConductorClient<B> {
        &self.conductor
    }

    /// Current scroll offset (lines from bottom)
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so the user sees the UI
        terminal.draw(|frame| self.draw(frame))?;

        if tokio::time::timeout(STARTUP_CHECK_TIMEOUT, self.conductor.start())
            .await
            .is_err()
        {
            tracing::warn!("Backend health check timed out");
        }
        self.last_frame = Instant::now();

        while self.running {
            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Terminal event error");
                            self.running = false;
                        }
                        None => self.running = false,
                    }
                }

                () = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            self.update();
            terminal.draw(|frame| self.draw(frame))?;
        }

        Ok(())
    }

    /// Dispatch one terminal event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.running = false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }

            // Submit message
            KeyCode::Enter => {
                if let Some(id) = self.conductor.submit_input() {
                    tracing::debug!(exchange = %id, "Submitted");
                    self.scroll_offset = 0;
                }
            }

            // Typing
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.conductor.push_char(c);
            }
            KeyCode::Backspace => self.conductor.pop_char(),

            // Conversation scrolling
            KeyCode::PageUp => self.scroll_up(self.page_step()),
            KeyCode::PageDown => self.scroll_down(self.page_step()),
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.max_scroll();
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = 0;
            }

            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll_up(WHEEL_STEP),
            MouseEventKind::ScrollDown => self.scroll_down(WHEEL_STEP),
            _ => {}
        }
    }

    fn page_step(&self) -> usize {
        (self.page_height / 2).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.page_height)
    }

    fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_scroll());
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Apply finished exchanges and advance the reveal by real elapsed time
    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.update_by(delta);
    }

    /// Apply finished exchanges and advance the reveal by `delta`
    pub fn update_by(&mut self, delta: Duration) {
        self.conductor.update(delta);
    }

    /// Draw the whole UI into a frame
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let footer = INPUT_HEIGHT + 1;
        if area.height <= footer || area.width < 10 {
            return;
        }

        let conversation = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(footer));
        let input = Rect::new(
            area.x,
            area.y + conversation.height,
            area.width,
            area.height.saturating_sub(1).min(INPUT_HEIGHT),
        );
        let status = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);

        let buf = frame.buffer_mut();
        self.render_conversation(buf, conversation);
        self.render_input(buf, input);
        self.render_status(buf, status);
    }

    /// Render conversation pane
    fn render_conversation(&mut self, buf: &mut Buffer, area: Rect) {
        let width = area.width.saturating_sub(1) as usize;
        let height = area.height as usize;
        self.page_height = height;

        if width < 10 || height < 1 {
            return;
        }

        let lines = build_transcript_lines(
            self.conductor.transcript(),
            self.conductor.active_reveal(),
            self.conductor.is_busy(),
            width,
        );
        self.total_lines = lines.len();

        // Clamp scroll offset
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());

        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        for (row, line) in lines[visible_start..visible_end].iter().enumerate() {
            let Ok(row) = u16::try_from(row) else {
                break;
            };
            buf.set_stringn(
                area.x,
                area.y + row,
                &line.text,
                area.width as usize,
                line_style(line.kind),
            );
        }

        if visible_start > 0 {
            buf.set_string(
                area.right().saturating_sub(2),
                area.y,
                "^",
                Style::default().fg(Color::Yellow),
            );
        }
    }

    /// Render input box
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        if area.height == 0 {
            return;
        }

        let separator = "-".repeat(area.width as usize);
        buf.set_string(area.x, area.y, &separator, Style::default().fg(DIM_GRAY));

        let text_height = area.height.saturating_sub(1) as usize;
        let text_width = area.width.saturating_sub(1) as usize;
        if text_width < 5 || text_height < 1 {
            return;
        }

        let style = if self.conductor.is_busy() {
            Style::default().fg(DIM_GRAY)
        } else {
            Style::default().fg(USER_GREEN)
        };

        let full_input = format!("You: {}_", self.conductor.input());
        let wrapped = textwrap::wrap(&full_input, text_width);
        let skip = wrapped.len().saturating_sub(text_height);

        for (i, line) in wrapped.iter().skip(skip).enumerate() {
            let Ok(i) = u16::try_from(i) else {
                break;
            };
            buf.set_string(area.x, area.y + 1 + i, line, style);
        }
    }

    /// Render status bar
    fn render_status(&self, buf: &mut Buffer, area: Rect) {
        let (state, style) = if self.conductor.is_busy() {
            ("Waiting for reply...", Style::default().fg(PICKSMART_TEAL))
        } else if self.conductor.reveal_state() == RevealState::Revealing {
            (
                self.conductor.reveal_state().description(),
                Style::default().fg(PICKSMART_TEAL),
            )
        } else if self.conductor.backend_available() == Some(false) {
            ("Backend unreachable", Style::default().fg(ERROR_RED))
        } else {
            ("Ready", Style::default().fg(DIM_GRAY))
        };

        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines - PgDn to scroll]", self.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(" {state} | Enter send | Esc quit | PgUp/PgDn scroll{scroll_info}");
        buf.set_stringn(area.x, area.y, &status, area.width as usize, style);
    }
}
