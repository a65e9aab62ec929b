//! Which catalog title, if any, is open in the detail pane.

/// The list and detail views are mutually exclusive: exactly one of these
/// holds at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Browsing,
    Inspecting(String),
}

/// What a transition did, so callers know whether to start or drop a
/// detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Browsing → Inspecting(id).
    Opened(String),
    /// Inspecting(old) → Inspecting(id), without passing through Browsing.
    Replaced { previous: String, current: String },
    /// Inspecting → Browsing.
    Closed(String),
    /// Nothing changed.
    Unchanged,
}

impl Selection {
    /// Selecting the open title closes it; selecting another title replaces it.
    pub fn select(&mut self, id: &str) -> Transition {
        match std::mem::take(self) {
            Selection::Browsing => {
                *self = Selection::Inspecting(id.to_string());
                Transition::Opened(id.to_string())
            }
            Selection::Inspecting(current) if current == id => Transition::Closed(current),
            Selection::Inspecting(previous) => {
                *self = Selection::Inspecting(id.to_string());
                Transition::Replaced {
                    previous,
                    current: id.to_string(),
                }
            }
        }
    }

    pub fn close(&mut self) -> Transition {
        match std::mem::take(self) {
            Selection::Browsing => Transition::Unchanged,
            Selection::Inspecting(id) => Transition::Closed(id),
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        match self {
            Selection::Browsing => None,
            Selection::Inspecting(id) => Some(id),
        }
    }

    pub fn is_inspecting(&self) -> bool {
        matches!(self, Selection::Inspecting(_))
    }
}
