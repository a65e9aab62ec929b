//! Shared rendering helpers.

use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
};

const SPINNER_FRAMES: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub(super) fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

/// Scrubs terminal escapes from catalog text and fits it to `max_width` columns.
pub(super) fn clean_text(raw: &str, max_width: usize) -> String {
    let stripped = strip_control_chars(raw);
    truncate_to_width(&stripped, max_width).into_owned()
}

pub(super) fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

pub(super) fn selected_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Index of the first row to show so that `selected` stays visible.
pub(super) fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    selected.saturating_sub(visible - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_wraps() {
        assert_eq!(spinner(0), spinner(SPINNER_FRAMES.len()));
    }

    #[test]
    fn test_clean_text_strips_and_truncates() {
        assert_eq!(clean_text("\x1b[31mInception\x1b[0m", 40), "Inception");
        assert_eq!(clean_text("The Lord of the Rings", 10), "The Lor...");
    }

    #[test]
    fn test_centered_rect_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let r = centered_rect(80, 80, parent);
        assert_eq!(r, Rect::new(10, 5, 80, 40));
    }

    #[test]
    fn test_scroll_offset_keeps_selection_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(3, 0), 0);
    }
}
