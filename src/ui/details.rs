//! Detail pane for the inspected movie.
//!
//! Shows a spinner while the lookup is in flight, the failure message if it
//! failed, and otherwise the record with either the rating widget or the
//! rating already recorded for a watched title.

use crate::app::{App, DetailState, Focus, MAX_RATING};
use crate::catalog::CatalogDetail;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::helpers::{border_style, clean_text, spinner};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Panel))
        .title("Details [Esc] back");

    let paragraph = match &app.detail {
        DetailState::Loading { .. } | DetailState::Idle => {
            Paragraph::new(format!("{} Loading...", spinner(app.spinner_frame)))
                .alignment(Alignment::Center)
        }
        DetailState::Failed { error, .. } => Paragraph::new(Line::from(vec![
            Span::raw("⛔️ "),
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
        ]))
        .alignment(Alignment::Center),
        DetailState::Loaded { detail } => {
            let width = area.width.saturating_sub(2) as usize;
            Paragraph::new(detail_lines(app, detail, width)).wrap(Wrap { trim: false })
        }
    };

    f.render_widget(paragraph.block(block), area);
}

fn detail_lines(app: &App, detail: &CatalogDetail, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(Span::styled(
            clean_text(&detail.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} • {}",
                clean_text(&detail.released, width),
                clean_text(&detail.runtime, width)
            ),
            dim,
        )),
        Line::from(Span::styled(clean_text(&detail.genre, width), dim)),
        Line::from(format!("⭐️ {} IMDb rating", clean_text(&detail.imdb_rating, 8))),
        Line::from(""),
    ];

    match app.inspected_watched_rating() {
        Some(rating) => {
            lines.push(Line::from(format!("You rated this movie {} 🌟", rating)));
        }
        None => {
            lines.push(rating_line(app.rating.value));
            if app.can_add() {
                lines.push(Line::from(Span::styled(
                    "[a] + Add to list",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(Span::styled("1-9, 0 or ←/→ to rate", dim)));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        strip(&detail.plot),
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Starring {}", strip(&detail.actors))));
    lines.push(Line::from(format!("Directed by {}", strip(&detail.director))));
    lines
}

/// Ten stars, filled up to `value`.
fn rating_line(value: u8) -> Line<'static> {
    let filled = "★".repeat(value as usize);
    let empty = "☆".repeat(MAX_RATING.saturating_sub(value) as usize);
    let label = if value > 0 {
        format!(" {}/{}", value, MAX_RATING)
    } else {
        String::new()
    };
    Line::from(vec![
        Span::styled(filled, Style::default().fg(Color::Yellow)),
        Span::styled(empty, Style::default().fg(Color::DarkGray)),
        Span::raw(label),
    ])
}

// Wrapped fields only need escapes removed
fn strip(raw: &str) -> String {
    crate::util::strip_control_chars(raw).into_owned()
}
