// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Keyboard-driven roleplay session notes

mod app;
mod autosave;
mod codec;
mod config;
mod handlers;
mod note;
mod sanitize;
mod search;
mod session;
mod store;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use handlers::{handle_key, Flow};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rpnotes")]
#[command(version)]
#[command(about = "Roleplay session notes with structured headers and autosave")]
struct CliArgs {
    /// Use this notes directory instead of the configured one
    #[arg(long, value_name = "DIR")]
    notes_dir: Option<PathBuf>,
}

/// Log to a file in the config directory; the terminal belongs to the UI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("rpnotes.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let poll_timeout = Duration::from_millis(250);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;
        app.tick_save_indicator();
        app.check_auto_save();

        if !event::poll(poll_timeout)? {
            continue;
        }

        let Ok(Event::Key(key)) = event::read() else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if handle_key(app, key) == Flow::Quit {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config_dir = config::ensure_config_dir()?;
    init_logging(&config_dir)?;
    let config = config::load_config(&config_dir)?;
    let notes_dir = args
        .notes_dir
        .unwrap_or_else(|| config.notes_dir(&config_dir));
    tracing::info!(notes_dir = %notes_dir.display(), "starting");

    let mut app = App::new(config_dir, config, notes_dir)?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    enable_raw_mode()?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}
