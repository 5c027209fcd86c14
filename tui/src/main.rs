//! PickSmart TUI Entry Point
//!
//! Launches the terminal chat client for PickSmart.
//!
//! Usage:
//!   picksmart [OPTIONS]
//!
//! Logs go to `picksmart-tui.log` in the system temp directory; set
//! `RUST_LOG=debug` for more detail.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use picksmart_conductor::{default_config_path, load_config_from_path, ConfigOverrides};
use picksmart_tui::{App, ConductorClient};

/// PickSmart - AI-powered product search in your terminal
#[derive(Parser, Debug)]
#[command(name = "picksmart")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "PICKSMART_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL of the PickSmart backend
    #[arg(short = 'u', long, value_name = "URL")]
    backend_url: Option<String>,

    /// Milliseconds between revealed words
    #[arg(long, value_name = "MS")]
    cadence_ms: Option<u64>,
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join("picksmart-tui.log");
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = init_logging()?;

    // Resolve configuration: file, then env, then CLI
    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path.as_deref())?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.backend_url {
        overrides = overrides.with_backend_url(url);
    }
    if let Some(ms) = args.cadence_ms {
        overrides = overrides.with_cadence_ms(ms);
    }
    overrides.apply(&mut config);
    config.validate()?;

    tracing::info!(
        source = %config.source(),
        url = %config.backend.url,
        cadence_ms = config.cadence_ms,
        log = %log_path.display(),
        "Configuration loaded"
    );

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: picksmart requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        std::process::exit(1);
    }

    let client = ConductorClient::from_config(&config)?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(client);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}
