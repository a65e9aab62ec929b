use crate::app::{App, Focus};
use crate::util::display_width;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::helpers::{border_style, clean_text, scroll_offset, selected_style, spinner};

/// Render the search result box: loader, inline error, or the list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let focused = app.focus == Focus::Results;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(focused))
        .title("Results");

    if app.is_loading {
        let loader = Paragraph::new(format!("{} Loading...", spinner(app.spinner_frame)))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(loader, area);
        return;
    }

    if let Some(error) = &app.error {
        let msg = Paragraph::new(Line::from(vec![
            Span::raw("⛔️ "),
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
        ]))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(app.selected_result, visible);
    let inspected = app.selection.selected_id();

    let items: Vec<ListItem> = app
        .movies
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, movie)| {
            let marker = if inspected == Some(movie.id.as_str()) {
                "▶ "
            } else {
                "  "
            };
            let year = format!(" 🗓 {}", clean_text(&movie.year, 12));
            let title_width = inner_width.saturating_sub(display_width(marker) + display_width(&year) + 1);
            let content = format!("{}{}{}", marker, clean_text(&movie.title, title_width), year);

            let style = if i == app.selected_result {
                selected_style()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(content, style)))
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
