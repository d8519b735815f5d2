mod api;
mod app;
mod config;
mod logging;
mod ui;
mod views;

use crate::api::client::ApiClient;
use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::AppState;
use crate::views::flash::FlashKind;
use anyhow::Result;
use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    let cfg = config::load_config()?;
    if let Err(e) = logging::init(&cfg.logging) {
        eprintln!("Logging disabled: {}", e);
    }
    info!(server = %cfg.server.base_url, "starting ptoterm");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, cfg).await;

    restore_terminal()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let client = ApiClient::new(&cfg.server, event_tx.clone())?;
    let mut state = AppState::new(cfg);

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if term_tx.send(AppEvent::Terminal(event)).is_err() {
                break;
            }
        }
    });

    // Tick task drives flash fades and autocomplete debouncing (50ms)
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_millis(50));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    let actions = handler::startup(&mut state);
    run_actions(&mut state, &client, actions);

    terminal.draw(|f| ui::render(f, &state))?;
    state.dirty = false;

    while let Some(event) = event_rx.recv().await {
        let actions = handler::handle_event(&mut state, event);
        run_actions(&mut state, &client, actions);

        if state.should_quit {
            break;
        }
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    info!("shutting down");
    Ok(())
}

fn run_actions(state: &mut AppState, client: &ApiClient, actions: Vec<Action>) {
    for action in actions {
        match action {
            Action::Api(request) => client.submit(request),
            Action::SaveUsername(name) => {
                if let Err(e) = config::save_config(&state.config) {
                    warn!(%name, error = %e, "could not save config");
                    state.flash(format!("Could not remember username: {}", e), FlashKind::Error);
                }
            }
            Action::Quit => state.should_quit = true,
        }
    }
}
