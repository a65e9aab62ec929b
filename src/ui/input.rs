//! Keyboard input handling.
//!
//! The help overlay captures every key while visible. Otherwise printable
//! characters go to the query when the search input has focus, digits set the
//! rating while a detail is open, and everything else is resolved through the
//! keybinding registry.

use crate::app::{App, AppEvent, Focus, MAX_RATING};
use crate::keybindings::Action as KbAction;
use crate::util::{validate_poster_url, MAX_QUERY_LENGTH};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::Action;

const MSG_NO_POSTER: &str = "No poster available";

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    if app.focus == Focus::Search && handle_query_edit(app, code, modifiers) {
        return Ok(Action::Continue);
    }

    if app.selection.is_inspecting() && app.focus != Focus::Search {
        if let Some(value) = rating_digit(code, modifiers) {
            app.set_user_rating(value);
            return Ok(Action::Continue);
        }
    }

    let scopes = app.active_scopes();
    let action = app.keybindings.action_for_key(code, modifiers, &scopes);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::FocusSearch) => app.focus_search(),
        Some(KbAction::Back) => app.focus = Focus::Results,
        Some(KbAction::Select) => app.select_highlighted(event_tx),
        Some(KbAction::CloseDetail) => app.close_movie(),
        Some(KbAction::RateUp) => {
            app.step_user_rating(1);
        }
        Some(KbAction::RateDown) => {
            app.step_user_rating(-1);
        }
        Some(KbAction::AddToWatched) => handle_add(app),
        Some(KbAction::RemoveWatched) => handle_remove(app),
        Some(KbAction::OpenPoster) => open_poster(app),
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        None => {}
    }

    Ok(Action::Continue)
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Edits the query. Returns true if the key was consumed.
fn handle_query_edit(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Char(c)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if app.query.chars().count() < MAX_QUERY_LENGTH {
                app.push_query_char(c);
            }
            true
        }
        KeyCode::Backspace => {
            app.pop_query_char();
            true
        }
        _ => false,
    }
}

/// `1`..`9` map to themselves and `0` to 10.
fn rating_digit(code: KeyCode, modifiers: KeyModifiers) -> Option<u8> {
    if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    match code {
        KeyCode::Char('0') => Some(MAX_RATING),
        KeyCode::Char(c) => c.to_digit(10).map(|d| d as u8),
        _ => None,
    }
}

fn handle_add(app: &mut App) {
    if app.confirm_add() {
        return;
    }
    if app.loaded_detail().is_some() && app.inspected_watched_rating().is_none() {
        app.set_status("Pick a rating first");
    }
}

fn handle_remove(app: &mut App) {
    let Some(item) = app.watched.items().get(app.selected_watched) else {
        return;
    };
    let title = item.title.clone();
    if app.delete_selected_watched() {
        app.set_status(format!("Removed {} from watched", title));
    }
}

fn open_poster(app: &mut App) {
    let Some(url) = app.highlighted_poster().map(str::to_string) else {
        app.set_status(MSG_NO_POSTER);
        return;
    };
    if let Err(e) = validate_poster_url(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        app.set_status("Opening poster...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::ScriptedCatalog;
    use crate::app::DetailState;
    use crate::search::SearchDebouncer;
    use crate::watched::store::fakes::MemorySlots;
    use crate::watched::{sample_item, WatchedCollection, WatchedStore};
    use std::sync::Arc;

    fn app_with(watched: WatchedCollection) -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let catalog = Arc::new(ScriptedCatalog::default().with_movie("tt1375666", "Inception"));
        let store = WatchedStore::new(Arc::new(MemorySlots::default()));
        let app = App::new(catalog, store, watched, SearchDebouncer::default());
        let (tx, rx) = mpsc::channel(8);
        (app, tx, rx)
    }

    fn press(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx).unwrap()
    }

    #[tokio::test]
    async fn test_typing_in_search_edits_query() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        for c in "qin".chars() {
            assert!(matches!(press(&mut app, KeyCode::Char(c), &tx), Action::Continue));
        }
        assert_eq!(app.query, "qin");
        press(&mut app, KeyCode::Backspace, &tx);
        assert_eq!(app.query, "qi");
    }

    #[tokio::test]
    async fn test_q_quits_outside_search() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        app.focus = Focus::Results;
        assert!(matches!(press(&mut app, KeyCode::Char('q'), &tx), Action::Quit));
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_search() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        let action = handle_input(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &tx).unwrap();
        assert!(matches!(action, Action::Quit));
        assert!(app.query.is_empty());
    }

    #[tokio::test]
    async fn test_query_length_capped() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        for _ in 0..MAX_QUERY_LENGTH + 10 {
            press(&mut app, KeyCode::Char('a'), &tx);
        }
        assert_eq!(app.query.chars().count(), MAX_QUERY_LENGTH);
    }

    #[tokio::test]
    async fn test_esc_leaves_search_input() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        press(&mut app, KeyCode::Esc, &tx);
        assert_eq!(app.focus, Focus::Results);
    }

    #[tokio::test]
    async fn test_enter_focuses_search_and_clears_query() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        app.query = "inception".into();
        app.focus = Focus::Results;
        press(&mut app, KeyCode::Enter, &tx);
        assert_eq!(app.focus, Focus::Search);
        assert!(app.query.is_empty());
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        app.focus = Focus::Results;
        press(&mut app, KeyCode::Char('?'), &tx);
        assert!(app.show_help);

        // q closes the overlay instead of quitting
        assert!(matches!(press(&mut app, KeyCode::Char('q'), &tx), Action::Continue));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_select_and_rate_with_digits() {
        let (mut app, tx, mut rx) = app_with(WatchedCollection::new());
        app.movies = vec![crate::app::test_support::summary("tt1375666", "Inception")];
        app.focus = Focus::Results;

        press(&mut app, KeyCode::Char(' '), &tx);
        assert_eq!(app.selection.selected_id(), Some("tt1375666"));

        match rx.recv().await.unwrap() {
            AppEvent::DetailLoaded {
                id,
                generation,
                result,
            } => {
                app.apply_detail_loaded(&id, generation, result);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(app.detail, DetailState::Loaded { .. }));

        press(&mut app, KeyCode::Char('8'), &tx);
        assert_eq!(app.rating.value, 8);
        press(&mut app, KeyCode::Char('0'), &tx);
        assert_eq!(app.rating.value, 10);
        assert_eq!(app.rating.decisions, 2);

        press(&mut app, KeyCode::Char('a'), &tx);
        assert!(app.watched.contains("tt1375666"));
        assert!(!app.selection.is_inspecting());
    }

    #[tokio::test]
    async fn test_arrow_rates_open_detail_from_result_list() {
        let (mut app, tx, mut rx) = app_with(WatchedCollection::new());
        app.movies = vec![crate::app::test_support::summary("tt1375666", "Inception")];
        app.focus = Focus::Results;

        press(&mut app, KeyCode::Right, &tx);
        assert_eq!(app.selection.selected_id(), Some("tt1375666"));
        match rx.recv().await.unwrap() {
            AppEvent::DetailLoaded {
                id,
                generation,
                result,
            } => {
                app.apply_detail_loaded(&id, generation, result);
            }
            other => panic!("unexpected event {:?}", other),
        }

        press(&mut app, KeyCode::Right, &tx);
        press(&mut app, KeyCode::Right, &tx);
        assert_eq!(app.rating.value, 2);
        press(&mut app, KeyCode::Left, &tx);
        assert_eq!(app.rating.value, 1);
        assert_eq!(app.selection.selected_id(), Some("tt1375666"));
        assert!(matches!(app.detail, DetailState::Loaded { .. }));
    }

    #[tokio::test]
    async fn test_remove_watched_from_panel() {
        let mut watched = WatchedCollection::new();
        watched.add(sample_item("tt1", 7));
        watched.add(sample_item("tt2", 9));
        let (mut app, tx, _rx) = app_with(watched);
        app.focus = Focus::Panel;

        press(&mut app, KeyCode::Char('j'), &tx);
        press(&mut app, KeyCode::Char('d'), &tx);
        assert_eq!(app.watched.len(), 1);
        assert!(app.watched.contains("tt1"));
        assert_eq!(app.selected_watched, 0);
    }

    #[tokio::test]
    async fn test_open_poster_without_poster_sets_status() {
        let (mut app, tx, _rx) = app_with(WatchedCollection::new());
        app.focus = Focus::Results;
        press(&mut app, KeyCode::Char('p'), &tx);
        let (msg, _) = app.status_message.clone().unwrap();
        assert_eq!(msg, MSG_NO_POSTER);
    }

    #[test]
    fn test_rating_digit() {
        assert_eq!(rating_digit(KeyCode::Char('1'), KeyModifiers::NONE), Some(1));
        assert_eq!(rating_digit(KeyCode::Char('0'), KeyModifiers::NONE), Some(10));
        assert_eq!(rating_digit(KeyCode::Char('x'), KeyModifiers::NONE), None);
        assert_eq!(rating_digit(KeyCode::Char('5'), KeyModifiers::CONTROL), None);
    }
}
