//! Turnstile TUI - Library check-in kiosk and admin report terminal
//!
//! `turnstile-tui kiosk` runs the visitor-facing check-in flow behind the
//! staff login gate. `turnstile-tui admin` runs the report download panel.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use turnstile_core::TurnstileConfig;
use turnstile_tui::{App, Surface};

/// Log file written while the terminal is in raw mode
const LOG_FILE_NAME: &str = "turnstile.log";

#[derive(Parser)]
#[command(name = "turnstile-tui")]
#[command(about = "Library check-in kiosk and admin report terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    surface: SurfaceCommand,

    /// Configuration file (defaults to ~/.config/turnstile/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the check-in backend origin
    #[arg(long, global = true)]
    kiosk_url: Option<String>,

    /// Override the report backend origin
    #[arg(long, global = true)]
    report_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum SurfaceCommand {
    /// Visitor check-in kiosk
    Kiosk,
    /// Report download panel
    Admin,
}

impl From<SurfaceCommand> for Surface {
    fn from(command: SurfaceCommand) -> Self {
        match command {
            SurfaceCommand::Kiosk => Surface::Kiosk,
            SurfaceCommand::Admin => Surface::Admin,
        }
    }
}

/// Application entry point with panic handling for terminal restoration
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up panic hook to restore terminal on crash
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    init_logging(cli.verbose)?;

    let config = load_config(&cli)?;
    let result = run_app(cli.surface.into(), config).await;

    if let Err(e) = &result {
        tracing::error!("Application error: {}", e);
    }

    result
}

/// Log to a file in the data directory; the terminal belongs to the UI
fn init_logging(verbose: bool) -> Result<()> {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("turnstile"))
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    let level = if verbose { "turnstile=debug" } else { "turnstile=info" };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    Ok(())
}

/// Config file, then command-line overrides
fn load_config(cli: &Cli) -> Result<TurnstileConfig> {
    let mut config = match &cli.config {
        Some(path) => TurnstileConfig::load_from(path),
        None => TurnstileConfig::load(),
    };

    if let Some(url) = &cli.kiosk_url {
        config.kiosk_base_url = url.clone();
    }
    if let Some(url) = &cli.report_url {
        config.report_base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Main application runner
async fn run_app(surface: Surface, config: TurnstileConfig) -> Result<()> {
    // App first, so a bad configuration fails before the screen is taken over
    let mut app = App::new(surface, config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}
