use crate::catalog::{Catalog, CatalogDetail, CatalogError, CatalogSummary, MSG_TRANSPORT};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::search::{LookupTicket, QueryChange, SearchDebouncer};
use crate::selection::{Selection, Transition};
use crate::util::catch_task_panic;
use crate::watched::{WatchedCollection, WatchedItem, WatchedStore, WatchedSummary};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Terminal title while no detail is shown.
pub const DEFAULT_WINDOW_TITLE: &str = "usePopcorn";

/// Highest user rating.
pub const MAX_RATING: u8 = 10;

/// Which pane receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    /// Right pane: the open detail, or the watched list when browsing.
    Panel,
}

/// Detail pane state for the inspected title.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading { id: String },
    Loaded { detail: CatalogDetail },
    Failed { id: String, error: String },
}

/// Rating being chosen in the open detail, before it is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingDraft {
    /// 0 until the user picks a rating.
    pub value: u8,
    /// Number of times the chosen value changed.
    pub decisions: u32,
}

/// Which background lookup panicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Search { token: u64 },
    Detail { generation: u64 },
}

/// Completions sent from background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    SearchCompleted {
        query: String,
        token: u64,
        result: Result<Vec<CatalogSummary>, CatalogError>,
    },
    DetailLoaded {
        id: String,
        generation: u64,
        result: Result<CatalogDetail, CatalogError>,
    },
    /// A lookup task panicked before it could report a result.
    TaskPanicked { lookup: LookupKind, error: String },
}

/// Application state.
///
/// Owned by the event loop task; background lookups only ever send
/// [`AppEvent`]s back.
pub struct App {
    catalog: Arc<dyn Catalog>,
    store: WatchedStore,
    pub keybindings: KeybindingRegistry,

    // === Search ===
    pub query: String,
    search: SearchDebouncer,
    search_handle: Option<JoinHandle<()>>,
    pub movies: Vec<CatalogSummary>,
    pub is_loading: bool,
    /// Inline error shown in place of the result list.
    pub error: Option<String>,

    // === Detail ===
    pub selection: Selection,
    pub detail: DetailState,
    detail_generation: u64,
    detail_handle: Option<JoinHandle<()>>,
    pub rating: RatingDraft,

    // === Watched ===
    pub watched: WatchedCollection,
    persisted_revision: u64,

    // === View ===
    pub focus: Focus,
    pub selected_result: usize,
    pub selected_watched: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub spinner_frame: usize,
    pub needs_redraw: bool,
}

impl App {
    /// Builds the application around an already-loaded watched list.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        store: WatchedStore,
        watched: WatchedCollection,
        search: SearchDebouncer,
    ) -> Self {
        let persisted_revision = watched.revision();
        Self {
            catalog,
            store,
            keybindings: KeybindingRegistry::new(),
            query: String::new(),
            search,
            search_handle: None,
            movies: Vec::new(),
            is_loading: false,
            error: None,
            selection: Selection::Browsing,
            detail: DetailState::Idle,
            detail_generation: 0,
            detail_handle: None,
            rating: RatingDraft::default(),
            watched,
            persisted_revision,
            focus: Focus::Search,
            selected_result: 0,
            selected_watched: 0,
            status_message: None,
            show_help: false,
            help_scroll_offset: 0,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Replaces the query and reacts to it.
    ///
    /// A short query drops any pending or in-flight lookup and clears results,
    /// loading and error. Otherwise a lookup is scheduled and the open detail
    /// (if any) is closed.
    pub fn set_query(&mut self, query: String) {
        self.query = query;
        match self.search.on_query_change(&self.query, Instant::now()) {
            QueryChange::Cleared => {
                if let Some(handle) = self.search_handle.take() {
                    handle.abort();
                    tracing::debug!("Aborted in-flight search for short query");
                }
                self.is_loading = false;
                self.movies.clear();
                self.error = None;
                self.selected_result = 0;
            }
            QueryChange::Scheduled { .. } => {
                self.close_movie();
            }
        }
    }

    pub fn push_query_char(&mut self, c: char) {
        let mut query = std::mem::take(&mut self.query);
        query.push(c);
        self.set_query(query);
    }

    pub fn pop_query_char(&mut self) {
        let mut query = std::mem::take(&mut self.query);
        query.pop();
        self.set_query(query);
    }

    /// Deadline of the pending lookup, for the event loop's timer.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    /// Fires the pending lookup if its quiet period has elapsed.
    ///
    /// Returns true if a lookup was started.
    pub fn poll_search(&mut self, now: Instant, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        match self.search.take_due(now) {
            Some(ticket) => {
                self.spawn_search(ticket, event_tx);
                true
            }
            None => false,
        }
    }

    fn spawn_search(&mut self, ticket: LookupTicket, event_tx: &mpsc::Sender<AppEvent>) {
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
        }

        self.is_loading = true;
        self.error = None;
        tracing::debug!(query = %ticket.query, token = ticket.token, "Starting search");

        let catalog = Arc::clone(&self.catalog);
        let tx = event_tx.clone();
        self.search_handle = Some(tokio::spawn(async move {
            let LookupTicket { query, token } = ticket;
            let outcome = catch_task_panic(catalog.search(&query)).await;
            let event = match outcome {
                Ok(result) => AppEvent::SearchCompleted {
                    query,
                    token,
                    result,
                },
                Err(panic_msg) => {
                    tracing::error!(error = %panic_msg, query = %query, "Search task panicked");
                    AppEvent::TaskPanicked {
                        lookup: LookupKind::Search { token },
                        error: panic_msg,
                    }
                }
            };
            if tx.send(event).await.is_err() {
                tracing::debug!("Event channel closed before search completed");
            }
        }));
    }

    /// Applies a search completion if its token is still current.
    ///
    /// Returns false for stale completions, which leave state untouched.
    pub fn apply_search_completed(
        &mut self,
        query: &str,
        token: u64,
        result: Result<Vec<CatalogSummary>, CatalogError>,
    ) -> bool {
        if !self.search.is_current(token) {
            tracing::debug!(query = %query, token, "Discarding stale search result");
            return false;
        }

        self.search_handle = None;
        self.is_loading = false;
        self.selected_result = 0;

        match result {
            Ok(movies) => {
                tracing::debug!(query = %query, count = movies.len(), "Search results applied");
                self.movies = movies;
                self.error = None;
            }
            Err(e) => {
                if e.is_domain() {
                    tracing::debug!(query = %query, error = %e, "Search found nothing");
                } else {
                    tracing::warn!(query = %query, error = %e, "Search failed");
                }
                self.movies.clear();
                self.error = Some(e.user_message().to_string());
            }
        }
        true
    }

    /// Releases whatever a panicked lookup was holding.
    pub fn apply_task_panicked(&mut self, lookup: LookupKind) {
        match lookup {
            LookupKind::Search { token } if self.search.is_current(token) => {
                self.search_handle = None;
                self.is_loading = false;
                self.movies.clear();
                self.error = Some(MSG_TRANSPORT.to_string());
            }
            LookupKind::Detail { generation } if generation == self.detail_generation => {
                self.detail_handle = None;
                if let DetailState::Loading { id } = &self.detail {
                    self.detail = DetailState::Failed {
                        id: id.clone(),
                        error: MSG_TRANSPORT.to_string(),
                    };
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Selection and detail
    // ========================================================================

    /// Toggles or replaces the inspected title.
    pub fn select_movie(&mut self, id: &str, event_tx: &mpsc::Sender<AppEvent>) {
        match self.selection.select(id) {
            Transition::Opened(id) | Transition::Replaced { current: id, .. } => {
                self.spawn_detail(id, event_tx);
            }
            Transition::Closed(id) => {
                tracing::debug!(id = %id, "Detail toggled closed");
                self.end_detail();
            }
            Transition::Unchanged => {}
        }
    }

    /// Opens (or toggles) the highlighted search result.
    pub fn select_highlighted(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if let Some(id) = self.movies.get(self.selected_result).map(|m| m.id.clone()) {
            self.select_movie(&id, event_tx);
        }
    }

    /// Returns to browsing. No-op when nothing is open.
    pub fn close_movie(&mut self) {
        if let Transition::Closed(id) = self.selection.close() {
            tracing::debug!(id = %id, "Detail closed");
            self.end_detail();
        }
    }

    fn end_detail(&mut self) {
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
        }
        // Invalidate any completion still on its way
        self.detail_generation = self.detail_generation.wrapping_add(1);
        self.detail = DetailState::Idle;
        self.rating = RatingDraft::default();
    }

    fn spawn_detail(&mut self, id: String, event_tx: &mpsc::Sender<AppEvent>) {
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
        }
        self.detail_generation = self.detail_generation.wrapping_add(1);
        let generation = self.detail_generation;
        self.detail = DetailState::Loading { id: id.clone() };
        self.rating = RatingDraft::default();

        let catalog = Arc::clone(&self.catalog);
        let tx = event_tx.clone();
        self.detail_handle = Some(tokio::spawn(async move {
            let outcome = catch_task_panic(catalog.fetch_detail(&id)).await;
            let event = match outcome {
                Ok(result) => AppEvent::DetailLoaded {
                    id,
                    generation,
                    result,
                },
                Err(panic_msg) => {
                    tracing::error!(error = %panic_msg, id = %id, "Detail task panicked");
                    AppEvent::TaskPanicked {
                        lookup: LookupKind::Detail { generation },
                        error: panic_msg,
                    }
                }
            };
            if tx.send(event).await.is_err() {
                tracing::debug!("Event channel closed before detail loaded");
            }
        }));
    }

    /// Applies a detail completion if it belongs to the current selection.
    pub fn apply_detail_loaded(
        &mut self,
        id: &str,
        generation: u64,
        result: Result<CatalogDetail, CatalogError>,
    ) -> bool {
        if generation != self.detail_generation || self.selection.selected_id() != Some(id) {
            tracing::debug!(id = %id, generation, current = self.detail_generation, "Discarding stale detail");
            return false;
        }

        self.detail_handle = None;
        self.detail = match result {
            Ok(detail) => DetailState::Loaded { detail },
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Detail lookup failed");
                DetailState::Failed {
                    id: id.to_string(),
                    error: e.user_message().to_string(),
                }
            }
        };
        true
    }

    /// The detail for the inspected title, once loaded.
    pub fn loaded_detail(&self) -> Option<&CatalogDetail> {
        match &self.detail {
            DetailState::Loaded { detail } if self.selection.selected_id() == Some(&detail.id) => {
                Some(detail)
            }
            _ => None,
        }
    }

    // ========================================================================
    // Rating and watched list
    // ========================================================================

    /// Rating already recorded for the inspected title, if it is watched.
    pub fn inspected_watched_rating(&self) -> Option<u8> {
        let id = self.selection.selected_id()?;
        self.watched.get(id).map(|item| item.user_rating)
    }

    fn can_rate(&self) -> bool {
        self.loaded_detail().is_some() && self.inspected_watched_rating().is_none()
    }

    /// Sets the draft rating. Choosing a different value counts as a decision.
    pub fn set_user_rating(&mut self, value: u8) -> bool {
        if !self.can_rate() || !(1..=MAX_RATING).contains(&value) {
            return false;
        }
        if value != self.rating.value {
            self.rating.value = value;
            self.rating.decisions += 1;
        }
        true
    }

    /// Moves the draft rating by `delta`, clamped to 1..=10.
    pub fn step_user_rating(&mut self, delta: i8) -> bool {
        let next = (i16::from(self.rating.value) + i16::from(delta)).clamp(1, i16::from(MAX_RATING));
        self.set_user_rating(next as u8)
    }

    /// True when the add action should be offered.
    pub fn can_add(&self) -> bool {
        self.can_rate() && (1..=MAX_RATING).contains(&self.rating.value)
    }

    /// Records the inspected title as watched and closes the detail.
    pub fn confirm_add(&mut self) -> bool {
        if !self.can_add() {
            return false;
        }
        let Some(detail) = self.loaded_detail() else {
            return false;
        };

        let item = WatchedItem::from_detail(detail, self.rating.value, self.rating.decisions);
        let title = item.title.clone();
        self.watched.add(item);
        self.close_movie();
        self.set_status(format!("Added {} to watched", title));
        true
    }

    /// Removes every record for `id`.
    pub fn delete_watched(&mut self, id: &str) -> bool {
        let removed = self.watched.remove(id);
        if removed {
            self.selected_watched = self
                .selected_watched
                .min(self.watched.len().saturating_sub(1));
        }
        removed
    }

    pub fn delete_selected_watched(&mut self) -> bool {
        match self.watched.items().get(self.selected_watched).map(|i| i.id.clone()) {
            Some(id) => self.delete_watched(&id),
            None => false,
        }
    }

    /// Persists the watched list if it changed since the last successful save.
    ///
    /// Called by the event loop after every handled event, so each mutation
    /// is written exactly once regardless of which path made it.
    pub async fn sync_watched(&mut self) -> bool {
        let revision = self.watched.revision();
        if revision == self.persisted_revision {
            return false;
        }
        match self.store.save(&self.watched).await {
            Ok(()) => {
                self.persisted_revision = revision;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, revision, "Failed to persist watched list");
                self.set_status("Failed to save watched list");
                false
            }
        }
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watched.summary()
    }

    // ========================================================================
    // View state
    // ========================================================================

    /// `Movie | <title>` while a detail is loaded, else the default title.
    pub fn window_title(&self) -> Cow<'static, str> {
        match self.loaded_detail() {
            Some(detail) => Cow::Owned(format!("Movie | {}", detail.title)),
            None => Cow::Borrowed(DEFAULT_WINDOW_TITLE),
        }
    }

    /// Keybinding scopes for the current focus, most specific first.
    pub fn active_scopes(&self) -> Vec<Context> {
        let inspecting = self.selection.is_inspecting();
        match self.focus {
            Focus::Search if inspecting => vec![Context::Details, Context::Search],
            Focus::Search => vec![Context::Search],
            Focus::Results if inspecting => vec![Context::Details, Context::Results],
            Focus::Results => vec![Context::Results],
            Focus::Panel if inspecting => vec![Context::Details],
            Focus::Panel => vec![Context::Watched],
        }
    }

    /// Focuses the search input and clears the query, unless it already has focus.
    pub fn focus_search(&mut self) {
        if self.focus == Focus::Search {
            return;
        }
        self.focus = Focus::Search;
        self.set_query(String::new());
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Results,
            Focus::Results => Focus::Panel,
            Focus::Panel => Focus::Search,
        };
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Search | Focus::Results => {
                if !self.movies.is_empty() {
                    self.selected_result = (self.selected_result + 1).min(self.movies.len() - 1);
                }
            }
            Focus::Panel if !self.selection.is_inspecting() => {
                if !self.watched.is_empty() {
                    self.selected_watched = (self.selected_watched + 1).min(self.watched.len() - 1);
                }
            }
            Focus::Panel => {}
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Search | Focus::Results => {
                self.selected_result = self.selected_result.saturating_sub(1);
            }
            Focus::Panel if !self.selection.is_inspecting() => {
                self.selected_watched = self.selected_watched.saturating_sub(1);
            }
            Focus::Panel => {}
        }
    }

    /// Poster of whatever the user is looking at.
    pub fn highlighted_poster(&self) -> Option<&str> {
        if let Some(detail) = self.loaded_detail() {
            return detail.poster.as_deref();
        }
        match self.focus {
            Focus::Panel => self
                .watched
                .items()
                .get(self.selected_watched)
                .and_then(|i| i.poster.as_deref()),
            Focus::Search | Focus::Results => self
                .movies
                .get(self.selected_result)
                .and_then(|m| m.poster.as_deref()),
        }
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Set status message (expires after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message if it is 3 seconds old. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
            tracing::debug!("Aborted search task on App drop");
        }
        if let Some(handle) = self.detail_handle.take() {
            handle.abort();
            tracing::debug!("Aborted detail task on App drop");
        }
    }
}
