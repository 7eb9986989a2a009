pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;
use tokio::time::error::Elapsed;

use crate::college::CollegeRecord;
use crate::source::{CollegeFilter, CollegeSource};

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

type FetchHandle = JoinHandle<Result<anyhow::Result<Vec<CollegeRecord>>, Elapsed>>;

fn spawn_fetch(source: Arc<dyn CollegeSource>, filter: CollegeFilter) -> FetchHandle {
    tokio::spawn(async move {
        tokio::time::timeout(FETCH_TIMEOUT, async move {
            source.list_colleges(&filter).await
        })
        .await
    })
}

pub async fn run_tui(mut app: App, source: Arc<dyn CollegeSource>) -> anyhow::Result<()> {
    // Buffer stderr while the TUI owns the terminal
    crate::stderr_buffer::activate();

    // Sets up panic hooks too
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let mut pending_fetch: Option<FetchHandle> =
        Some(spawn_fetch(source.clone(), app.filter.clone()));
    app.is_loading = true;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        if let Some(handle) = pending_fetch.take_if(|h| h.is_finished()) {
            match handle.await {
                Ok(Ok(Ok(colleges))) => app.update_colleges(colleges),
                Ok(Ok(Err(e))) => {
                    tracing::warn!(error = %e, "college fetch failed");
                    app.show_error(format!("Refresh failed: {}", e));
                }
                Ok(Err(_elapsed)) => {
                    app.show_error(format!(
                        "Refresh timed out ({}s). Press r to retry.",
                        FETCH_TIMEOUT.as_secs()
                    ));
                }
                Err(e) => app.show_error(format!("Refresh task panicked: {}", e)),
            }
            app.is_loading = false;
        }

        if app.needs_refresh && pending_fetch.is_none() {
            app.needs_refresh = false;
            if app.force_refresh {
                source.refresh();
                app.force_refresh = false;
            }
            pending_fetch = Some(spawn_fetch(source.clone(), app.filter.clone()));
            app.is_loading = true;
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            // Selection
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('a') => app.add_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.remove_selected(),
            KeyCode::Char('c') => app.clear_selection(),
            KeyCode::Char('z') => app.undo_last(),

            KeyCode::Enter => app.show_detail(),
            KeyCode::Char('o') => app.open_selected(),
            KeyCode::Char('/') => app.start_search(),
            KeyCode::Tab => app.toggle_view(),
            KeyCode::Char('r') => app.request_refresh(),
            KeyCode::Char('?') => app.show_help(),

            // Esc clears an active search
            KeyCode::Esc if app.filter.search.is_some() => {
                app.filter.search = None;
                app.needs_refresh = true;
            }

            _ => {}
        },
        app::InputMode::Search => match key.code {
            KeyCode::Enter => app.confirm_search(),
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Backspace => {
                app.search_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => app.search_input.push(c),
            // Don't propagate to Normal mode
            _ => {}
        },
        app::InputMode::Detail => match key.code {
            KeyCode::Char('o') => app.open_selected(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => app.dismiss_popup(),
        },
        // Any key exits help
        app::InputMode::Help => app.dismiss_popup(),
    }
}
