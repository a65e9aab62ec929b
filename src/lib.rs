//! popcorn: search the OMDb catalog, inspect a title, rate it, and keep a
//! persistent list of what you watched, all from the terminal.
//!
//! The library holds every rule; the `popcorn` binary only wires the pieces
//! together and runs [`ui::run`].

pub mod app;
pub mod catalog;
pub mod config;
pub mod keybindings;
pub mod search;
pub mod selection;
pub mod storage;
pub mod ui;
pub mod util;
pub mod watched;
