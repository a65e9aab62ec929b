//! Terminal user interface.
//!
//! Consumes [`App`](crate::app::App) state and turns key presses into calls
//! on it. No rules live here.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background lookup completions
//! - `render` - Frame layout and navbar
//! - `results` - Search result box
//! - `details` - Movie detail pane with rating widget
//! - `watched` - Watched summary and list
//! - `status` - Status bar
//! - `help` - Keybinding overlay
//! - `helpers` - Shared rendering helpers

mod details;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod results;
mod status;
mod watched;

pub use loop_runner::{run, Action};
