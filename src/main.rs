mod api;
mod app;
mod components;
mod config;
mod events;
mod models;
mod tui;

use anyhow::{Context, Result};
use app::App;
use config::AppConfig;
use crossterm::{
    event::DisableMouseCapture,
    terminal::{self, LeaveAlternateScreen},
};
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tui::Tui;

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    // The terminal UI owns stdout, so logs go to a file.
    if let Err(e) = init_tracing(&config) {
        eprintln!("Logging disabled: {e:#}");
    }

    let _guard = CleanupGuard;

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut app = App::new(&config);

    let mut tui = Tui::new(terminal, app.framerate());
    tui.init()?;

    tracing::info!(api_url = %config.api_url, "starting");
    let res = app.run(&mut tui);

    tui.exit()?;

    if let Err(e) = res {
        tracing::error!(error = %e, "application error");
        eprintln!("Application Error: {e}");
    }
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("open log file {}", config.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jarurat_care=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;
    Ok(())
}

struct CleanupGuard;

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        // Ignore errors during cleanup
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}
