//! Stockcast TUI: upload a price CSV, forecast it, chart it, download it.
//!
//! Panels:
//! 1. Data: loaded file, cleaning report, cleaned rows with indicators
//! 2. Forecast: horizon slider, model choice, price chart with confidence band
//! 3. Export: forecast CSV, series CSV and JSON summary destinations
//! 4. Help: keyboard shortcuts

mod actions;
mod app;
mod input;
mod persistence;
mod theme;
mod ui;

#[cfg(test)]
mod test_helpers;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use stockcast_runner::ForecastConfig;

use crate::app::{AppState, ErrorCategory};

const APP_DIR: &str = "stockcast";

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Paths
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    let state_path = config_dir.join("state.json");
    let config_path = config_dir.join("config.toml");

    init_logging(&data_dir.join("stockcast.log"))?;
    tracing::info!(state = %state_path.display(), "starting");

    // Config file is optional; a bad one is reported, not fatal.
    let (config, config_error) = load_config(&config_path);

    let mut app = AppState::new(config, state_path.clone());
    persistence::apply(&mut app, persistence::load(&state_path));
    if let Some(message) = config_error {
        app.push_error(
            ErrorCategory::Config,
            message,
            config_path.display().to_string(),
        );
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    if let Err(e) = persistence::save(&app.state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "could not save state");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("exiting");
    result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(path: &Path) -> (ForecastConfig, Option<String>) {
    if !path.exists() {
        return (ForecastConfig::default(), None);
    }
    match ForecastConfig::from_file(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), model = %config.model, "loaded config");
            (config, None)
        }
        Err(e) => (ForecastConfig::default(), Some(format!("ConfigError: {e}"))),
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 3. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
