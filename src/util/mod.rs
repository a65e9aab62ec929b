//! Small helpers shared across the crate.
//!
//! - **Text**: column-aware truncation and control-character scrubbing for
//!   catalog text rendered in the terminal
//! - **URLs**: base URL and poster link validation
//! - **Tasks**: panic capture for background lookups

mod task;
mod text;
mod url_validator;

pub use task::catch_task_panic;
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_base_url, validate_poster_url, UrlValidationError};

/// Upper bound on the search query length accepted from the keyboard.
pub const MAX_QUERY_LENGTH: usize = 256;
