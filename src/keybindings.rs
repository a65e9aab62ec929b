//! Keybinding registry: (context, key) → action, with config overrides.
//!
//! Bindings are scoped. A key is looked up in each active context in order and
//! finally in `Global`, so the same key can mean different things depending
//! on which pane has focus and whether a detail is open.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// User-facing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    /// Focus the search input and clear the query.
    FocusSearch,
    /// Leave the search input.
    Back,
    /// Open (or toggle closed) the highlighted result.
    Select,
    CloseDetail,
    RateUp,
    RateDown,
    AddToWatched,
    RemoveWatched,
    OpenPoster,
    ShowHelp,
}

impl Action {
    /// Description for the help overlay.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::CycleFocus => "Cycle focus",
            Self::FocusSearch => "Focus search and clear query",
            Self::Back => "Leave search input",
            Self::Select => "Open / close movie details",
            Self::CloseDetail => "Close movie details",
            Self::RateUp => "Raise rating",
            Self::RateDown => "Lower rating",
            Self::AddToWatched => "Add to watched list",
            Self::RemoveWatched => "Remove from watched list",
            Self::OpenPoster => "Open poster in browser",
            Self::ShowHelp => "Show help",
        }
    }
}

/// Dispatch scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// Search input focused.
    Search,
    /// Result list focused.
    Results,
    /// A movie detail is open.
    Details,
    /// Watched list focused.
    Watched,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Search => "Search",
            Self::Results => "Results",
            Self::Details => "Details",
            Self::Watched => "Watched",
        }
    }
}

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    /// Terminals disagree on whether `?` arrives with SHIFT; the character
    /// already encodes it, so SHIFT is dropped for character keys.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers - KeyModifiers::SHIFT),
            _ => self,
        }
    }
}

/// Parse a key string from config.
///
/// Accepts single characters (`"q"`), named keys (`"Enter"`, `"Esc"`,
/// `"Delete"`, arrows), `"Ctrl+<char>"` and `"F1"`..`"F12"`.
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Human-readable key for the help overlay.
fn format_key(key: &KeySpec) -> String {
    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        format!("Ctrl+{}", name)
    } else {
        name
    }
}

fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().replace('-', "_").as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "cycle_focus" | "focus" => Some(Action::CycleFocus),
        "focus_search" | "search" => Some(Action::FocusSearch),
        "back" => Some(Action::Back),
        "select" | "open" => Some(Action::Select),
        "close_detail" | "close" => Some(Action::CloseDetail),
        "rate_up" => Some(Action::RateUp),
        "rate_down" => Some(Action::RateDown),
        "add_to_watched" | "add" => Some(Action::AddToWatched),
        "remove_watched" | "remove" | "delete" => Some(Action::RemoveWatched),
        "open_poster" | "poster" => Some(Action::OpenPoster),
        "show_help" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ctrl('c'), Action::Quit),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::FocusSearch),
    (Context::Global, KeySpec::ch('/'), Action::FocusSearch),
    (Context::Global, KeySpec::ch('p'), Action::OpenPoster),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Search, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Results, KeySpec::ch(' '), Action::Select),
    (Context::Results, KeySpec::ch('l'), Action::Select),
    (Context::Results, KeySpec::plain(KeyCode::Right), Action::Select),
    (Context::Details, KeySpec::plain(KeyCode::Esc), Action::CloseDetail),
    (Context::Details, KeySpec::plain(KeyCode::Right), Action::RateUp),
    (Context::Details, KeySpec::ch('+'), Action::RateUp),
    (Context::Details, KeySpec::plain(KeyCode::Left), Action::RateDown),
    (Context::Details, KeySpec::ch('-'), Action::RateDown),
    (Context::Details, KeySpec::ch('a'), Action::AddToWatched),
    (Context::Watched, KeySpec::ch('d'), Action::RemoveWatched),
    (Context::Watched, KeySpec::plain(KeyCode::Delete), Action::RemoveWatched),
];

/// Keybinding table with default bindings and config overrides.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for the help overlay.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::with_capacity(DEFAULT_BINDINGS.len()),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        let key = key.normalized();
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply overrides from the config `[keybindings]` table.
    ///
    /// An override replaces every key bound to the action with the new key,
    /// in each context the action was bound in. Returns one warning per entry
    /// that could not be applied.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, _) in self.bindings.iter().filter(|(_, _, a)| *a == action) {
                if !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Resolve a key against `scopes` in order, then `Global`.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        scopes: &[Context],
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();
        scopes
            .iter()
            .chain(std::iter::once(&Context::Global))
            .find_map(|ctx| self.lookup.get(&(*ctx, key)).copied())
    }

    /// (context, key label, action, description) for the help overlay.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
