use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.focus {
            Focus::Search => Cow::Borrowed("Type to search | [Esc] results [Tab] switch [?] help [Ctrl+c] quit"),
            _ if app.selection.is_inspecting() => {
                Cow::Borrowed("[1-9,0 ←/→] rate [a]dd [Esc] close [p]oster [Enter] search [q]uit")
            }
            Focus::Results => {
                Cow::Borrowed("[j/k] move [Space] open [p]oster [Tab] switch [Enter] search [q]uit")
            }
            Focus::Panel => Cow::Borrowed("[j/k] move [d]elete [p]oster [Tab] switch [Enter] search [q]uit"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
