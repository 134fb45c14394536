//! Meal list screen rendering
//!
//! Renders the main view listing every upcoming meal found in the cache.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Renders the meal list screen
///
/// Shows a header with the current time, one row per cached meal with the
/// number of lines it has, and a key hint bar. Build errors and an empty cache
/// get an explanatory message instead of the list.
pub fn render_meal_list(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Meal list
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    if let Some(error) = &app.error {
        render_message(frame, chunks[1], error, Color::Red);
    } else if app.meals.is_empty() {
        let hint = if app.prefetch_running {
            "No cached menus yet. Menus are downloading in the background; press r to reload."
        } else {
            "No cached menus. Run `cafmenu prefetch` or start without --offline."
        };
        render_message(frame, chunks[1], hint, Color::DarkGray);
    } else {
        render_list(frame, app, chunks[1]);
    }

    render_help(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let updated = app
        .last_refresh
        .map(|t| format!("updated {}", t.format("%H:%M")))
        .unwrap_or_default();

    let separator = "─".repeat((area.width as usize).saturating_sub(2));
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "CAFMENU",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(updated, Style::default().fg(Color::Gray)),
        ]),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .meals
        .iter()
        .map(|meal| {
            let count = meal.lines.len();
            let noun = if count == 1 { "line" } else { "lines" };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<16}", meal.label),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{} {}", count, noun),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Meals ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25B8} "); // ▸

    let mut state = ListState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Meals "));
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        "↑/↓ select  Enter open  r reload  ? help  q quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MealKind, MealSlot};
    use crate::presentation::MealEntry;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render_meal_list(frame, app);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_meal_list_shows_labels() {
        let slot = MealSlot::new(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(), MealKind::Lunch);
        let mut app = App::new();
        app.set_meals(Ok(vec![MealEntry {
            slot,
            label: slot.label(),
            lines: vec!["Grill: Burger".to_string()],
        }]));

        let content = render_to_string(&app);

        assert!(content.contains("CAFMENU"), "Should render header");
        assert!(content.contains("Mon Lunch"), "Should render meal label");
        assert!(content.contains("1 line"), "Should render line count");
    }

    #[test]
    fn test_empty_cache_shows_hint() {
        let mut app = App::new();
        app.prefetch_running = true;
        app.set_meals(Ok(Vec::new()));

        let content = render_to_string(&app);

        assert!(content.contains("No cached menus yet"));
    }

    #[test]
    fn test_finished_prefetch_drops_downloading_hint() {
        let mut app = App::new();
        app.prefetch_running = true;
        app.prefetch_finished();
        app.set_meals(Ok(Vec::new()));

        let content = render_to_string(&app);

        assert!(!content.contains("downloading"));
        assert!(content.contains("cafmenu prefetch"));
    }

    #[test]
    fn test_error_is_rendered() {
        let mut app = App::new();
        app.set_meals(Ok(Vec::new()));
        app.error = Some("Mon Lunch (2024-05-06): broken".to_string());

        let content = render_to_string(&app);

        assert!(content.contains("broken"));
    }
}
