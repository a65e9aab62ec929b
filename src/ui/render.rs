//! Frame layout.
//!
//! ```text
//! ┌ navbar: logo | search input | Found N results ┐
//! │ results box          │ details or watched     │
//! └ status bar ───────────────────────────────────┘
//! ```

use crate::app::{App, Focus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::helpers::{border_style, clean_text};
use super::{details, help, results, status, watched};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_navbar(f, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    results::render(f, app, columns[0]);
    if app.selection.is_inspecting() {
        details::render(f, app, columns[1]);
    } else {
        watched::render(f, app, columns[1]);
    }

    status::render(f, app, rows[2]);

    if app.show_help {
        help::render(f, app);
    }
}

fn render_navbar(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Min(10),
            Constraint::Length(22),
        ])
        .split(area);

    let logo = Paragraph::new(Span::styled(
        "🍿 usePopcorn",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(logo, columns[0]);

    let focused = app.focus == Focus::Search;
    let input_width = columns[1].width.saturating_sub(3) as usize;
    let query = if app.query.is_empty() && !focused {
        Line::from(Span::styled("Search movies...", Style::default().fg(Color::DarkGray)))
    } else {
        let cursor = if focused { "█" } else { "" };
        Line::from(format!("{}{}", tail_to_width(&app.query, input_width), cursor))
    };
    let input = Paragraph::new(query).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title("Search [Enter]"),
    );
    f.render_widget(input, columns[1]);

    let count = Paragraph::new(format!("Found {} results", app.movies.len()))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(count, columns[2]);
}

/// The end of the query that fits, so the cursor stays in view.
fn tail_to_width(query: &str, width: usize) -> String {
    let chars: Vec<char> = query.chars().collect();
    if chars.len() <= width {
        return clean_text(query, width);
    }
    let tail: String = chars[chars.len() - width..].iter().collect();
    clean_text(&tail, width)
}
