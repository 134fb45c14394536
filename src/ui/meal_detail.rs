//! Meal detail screen UI
//!
//! Lists the station and dish lines for a single meal, preceded by a back entry.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, BACK_ITEM};
use crate::presentation::CONTINUATION_PREFIX;

/// Renders the detail screen for the meal at `index`
pub fn render(frame: &mut Frame, app: &App, index: usize) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let title = app
        .meals
        .get(index)
        .map(|meal| format!(" {} ", meal.label))
        .unwrap_or_else(|| " Meal ".to_string());

    let items: Vec<ListItem> = app
        .detail_items(index)
        .into_iter()
        .map(|item| {
            let style = if item == BACK_ITEM {
                Style::default().fg(Color::DarkGray)
            } else if item.starts_with(CONTINUATION_PREFIX) {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(item.to_string(), style)))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("\u{25B8} ");

    let mut state = ListState::default().with_selected(Some(app.detail_index));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let help = Paragraph::new(Line::from(Span::styled(
        "↑/↓ move  Esc back  r reload  ? help  q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, chunks[1]);
}
