//! Background lookup completions.

use crate::app::{App, AppEvent};

/// Applies one completion to the application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::SearchCompleted {
            query,
            token,
            result,
        } => {
            app.apply_search_completed(&query, token, result);
        }
        AppEvent::DetailLoaded {
            id,
            generation,
            result,
        } => {
            app.apply_detail_loaded(&id, generation, result);
        }
        AppEvent::TaskPanicked { lookup, error } => {
            tracing::error!(?lookup, error = %error, "Lookup task panicked");
            app.apply_task_panicked(lookup);
            app.set_status("Internal error: lookup failed unexpectedly");
        }
    }
}
