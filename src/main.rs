//! chapel-tui - A terminal client for Pelsall Evangelical Church songs and sermons.

use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

mod action;
mod app;
mod client;
mod config;
mod feed;
mod last_played;
mod markup;
mod player;
mod playlist;
mod prefs;
mod queue;
mod route;
mod router;
mod storage;
mod tui;
mod ui;
mod views;

use action::Action;
use app::App;
use config::Config;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "chapel-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Data API URL (overrides config)
    #[arg(short, long)]
    server: Option<String>,

    /// Data API key (overrides config)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Sermon feed URL (overrides config)
    #[arg(short, long)]
    feed: Option<String>,

    /// Keep playlists and playback state in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hooks
    tui::install_hooks()?;

    // Initialize logging
    let log_file = dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("chapel-tui")
        .join("chapel-tui.log");

    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_subscriber::fmt::layer()
        .with_writer(std::fs::File::create(&log_file)?)
        .with_ansi(false);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::sink) // Don't write to stdout in TUI mode
        .finish()
        .with(file_appender)
        .try_init()
        .ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load().unwrap_or_default();

    // Apply command-line overrides
    if let Some(server) = args.server {
        config.server.url = server;
    }
    if let Some(api_key) = args.api_key {
        config.server.api_key = api_key;
    }
    if let Some(feed) = args.feed {
        config.server.feed_url = feed;
    }

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create application
    let mut app = App::new(config, args.ephemeral, action_tx.clone())?;

    // Initialize terminal
    let mut terminal = tui::init()?;

    // Initialize application
    app.init()?;

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        // Render UI
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = handle_key_event(key.code, key.modifiers, &app);
                        if action != Action::None {
                            action_tx.send(action)?;
                        }
                    }
                }
                Event::Resize(width, height) => {
                    action_tx.send(Action::Resize(width, height))?;
                }
                _ => {}
            }
        }

        // Send tick action
        action_tx.send(Action::Tick)?;

        // Process all pending actions
        while let Ok(action) = action_rx.try_recv() {
            app.handle_action(action)?;
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    tui::restore()?;

    Ok(())
}

/// Map key events to actions.
fn handle_key_event(code: KeyCode, modifiers: KeyModifiers, app: &App) -> Action {
    // Handle the text input overlay first; it swallows printable keys.
    if app.input.is_some() {
        return match code {
            KeyCode::Esc => Action::InputCancel,
            KeyCode::Enter => Action::InputSubmit,
            KeyCode::Backspace => Action::InputBackspace,
            KeyCode::Char(c) => Action::InputChar(c),
            _ => Action::None,
        };
    }

    // Handle help overlay
    if app.show_help {
        return match code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Action::HideHelp,
            _ => Action::None,
        };
    }

    // Handle error popup
    if app.error_message.is_some() {
        return match code {
            KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('q') => Action::ClearError,
            _ => Action::None,
        };
    }

    // Handle random play prompt
    if app.random_prompt {
        return match code {
            KeyCode::Char('1') => Action::RandomCount(5),
            KeyCode::Char('2') => Action::RandomCount(10),
            KeyCode::Char('3') => Action::RandomCount(15),
            KeyCode::Char('4') => Action::RandomCount(20),
            KeyCode::Esc | KeyCode::Char('q') => Action::CancelRandomPrompt,
            _ => Action::None,
        };
    }

    // Global keys
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        _ => {}
    }

    match code {
        // Navigation
        KeyCode::Up | KeyCode::Char('k') => Action::LinkUp,
        KeyCode::Down | KeyCode::Char('j') => Action::LinkDown,
        KeyCode::Enter => Action::ActivateLink,
        KeyCode::Esc | KeyCode::Backspace => Action::Back,
        KeyCode::Char('h') => Action::Navigate(route::HOME.to_string()),

        // Playback
        KeyCode::Char(' ') => Action::PlayPause,
        KeyCode::Char('S') => Action::Stop,
        KeyCode::Char('.') | KeyCode::Char('>') => Action::SeekForward,
        KeyCode::Char(',') | KeyCode::Char('<') => Action::SeekBackward,

        // Volume
        KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp,
        KeyCode::Char('-') => Action::VolumeDown,

        // Refresh
        KeyCode::Char('R') => Action::Refresh,

        // Help
        KeyCode::Char('?') => Action::ShowHelp,

        KeyCode::Char(c) => {
            // Keys the current view contributed, shown in the footer.
            for bind in &app.chrome.bindings {
                if bind.key == c {
                    return bind.action.clone();
                }
            }
            if c == 'x' {
                return Action::ClearError;
            }
            Action::None
        }

        _ => Action::None,
    }
}

use tracing_subscriber::prelude::*;
