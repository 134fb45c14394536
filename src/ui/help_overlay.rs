//! Help overlay listing the key bindings

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const OVERLAY_WIDTH: u16 = 50;

/// Key binding sections shown in the overlay
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("↑/k, ↓/j", "Move selection up/down"),
            ("Enter", "Open meal / activate Back"),
            ("Esc, h", "Back to meal list"),
            ("q", "Quit"),
        ],
    ),
    (
        "Menus",
        &[
            ("r", "Reload menus from cache"),
            ("?", "Toggle this help"),
        ],
    ),
];

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // borders
    let height = lines.len() as u16 + 2;
    let overlay_area = centered_rect(OVERLAY_WIDTH, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

fn help_lines() -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let note = Style::default().fg(Color::Gray);

    let mut lines = vec![Line::from(Span::styled(
        "Keyboard Shortcuts",
        bold.fg(Color::Cyan),
    ))];
    for (title, bindings) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(*title, bold)));
        lines.extend(bindings.iter().map(|(key, description)| {
            Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ])
        }));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("Menus download in the background at startup;", note)),
        Line::from(Span::styled("press r once they have arrived.", note)),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    lines
}

/// A `width` x `height` rect centered in `area`, clipped to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
