//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background lookup completions, the search
//! debounce deadline and a periodic tick on a single task.

use crate::app::{App, AppEvent, DetailState, DEFAULT_WINDOW_TITLE};
use anyhow::Result;
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::borrow::Cow;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::input::handle_input;
use super::render::render;

/// What the loop should do after a key press.
pub enum Action {
    Continue,
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Sources, in priority order:
/// - SIGTERM / SIGINT
/// - terminal key presses
/// - lookup completions from the `AppEvent` channel
/// - the pending search's debounce deadline
/// - a 250ms tick for the spinner and status expiry
///
/// After every handled event the watched list is synced to storage and the
/// terminal title is updated. A panic hook restores the terminal first.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), SetTitle(DEFAULT_WINDOW_TITLE), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));
    let mut window_title: Cow<'static, str> = Cow::Borrowed(DEFAULT_WINDOW_TITLE);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        // Completions queued while input was being handled
        while let Ok(event) = event_rx.try_recv() {
            handle_app_event(app, event);
            after_event(app, &mut window_title).await;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        let deadline = app.search_deadline();
        let debounce_fut = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        match handle_input(app, key.code, key.modifiers, &event_tx) {
                            Ok(Action::Quit) => break,
                            Ok(Action::Continue) => {}
                            Err(e) => app.set_status(format!("Error: {}", e)),
                        }
                        after_event(app, &mut window_title).await;
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal event stream failed");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            Some(event) = event_rx.recv() => {
                handle_app_event(app, event);
                after_event(app, &mut window_title).await;
            }

            _ = debounce_fut => {
                if app.poll_search(Instant::now(), &event_tx) {
                    app.needs_redraw = true;
                }
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Persistence observer and title scope, run after every state change.
async fn after_event(app: &mut App, window_title: &mut Cow<'static, str>) {
    app.needs_redraw = true;
    app.sync_watched().await;

    let title = app.window_title();
    if title != *window_title {
        if let Err(e) = execute!(io::stdout(), SetTitle(title.as_ref())) {
            tracing::debug!(error = %e, "Failed to set terminal title");
        }
        *window_title = title;
    }
}

fn handle_tick(app: &mut App) {
    let detail_loading = matches!(app.detail, DetailState::Loading { .. });
    if app.is_loading || detail_loading {
        app.advance_spinner();
        app.needs_redraw = true;
    }

    if app.clear_expired_status() {
        app.needs_redraw = true;
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle(DEFAULT_WINDOW_TITLE))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetTitle(DEFAULT_WINDOW_TITLE),
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
