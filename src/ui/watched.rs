use crate::app::{App, Focus};
use crate::util::display_width;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::helpers::{border_style, clean_text, scroll_offset, selected_style};

/// Render the watched summary above the watched list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 6 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let focused = app.focus == Focus::Panel;
    render_summary(f, app, chunks[0], focused);
    render_list(f, app, chunks[1], focused);
}

fn render_summary(f: &mut Frame, app: &App, area: Rect, focused: bool) {
    let summary = app.summary();
    let lines = vec![
        Line::from(Span::styled(
            "Movies you watched",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "#️⃣ {} movies  ⭐️ {:.2}  🌟 {:.2}  ⏳ {} min",
            summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.total_runtime
        )),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused)),
    );
    f.render_widget(paragraph, area);
}

fn render_list(f: &mut Frame, app: &App, area: Rect, focused: bool) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if app.watched.is_empty() {
        vec![ListItem::new("Rate a movie to add it here")]
    } else {
        let offset = scroll_offset(app.selected_watched, visible);
        app.watched
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, item)| {
                let stats = format!(
                    "  ⭐️ {:.1} 🌟 {} ⏳ {} min",
                    item.imdb_rating, item.user_rating, item.runtime
                );
                let title_width = inner_width.saturating_sub(display_width(&stats));
                let content = format!("{}{}", clean_text(&item.title, title_width), stats);

                let style = if focused && i == app.selected_watched {
                    selected_style()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(content, style)))
            })
            .collect()
    };

    let title = format!("Watched ({})", app.watched.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(focused))
            .title(title),
    );
    f.render_widget(list, area);
}
