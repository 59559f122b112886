// Help modal rendering

use crate::service::SessionService;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

pub fn render<S: SessionService>(f: &mut Frame, app: &App<S>) {
    let theme = &app.theme;
    let key_style = Style::default().fg(theme.highlight);
    let desc_style = Style::default().fg(theme.foreground);
    let header_style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);

    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Session", header_style)),
        kb("1 / 2", "Press left / right button"),
        kb("Enter", "Accept field, next prompt"),
        kb("Esc", "Cancel prompt"),
        Line::raw(""),
        Line::from(Span::styled("  Loops", header_style)),
        kb("Tab, ←/→", "Loops / members"),
        kb("↑/↓, j/k", "Select loop"),
        kb("Space", "Play / stop loop"),
        kb("d", "Remove loop"),
        kb("r", "Start / stop recording"),
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("u", "Refresh now"),
        kb("?", "Toggle this help"),
        kb("q", "Quit"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(theme.kind.name(), key_style),
        ]),
    ]);

    let area = centered_rect(44, 22, f.area());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(content)
        .style(Style::default().bg(theme.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.highlight))
                .border_type(theme.border_type)
                .title(" Help ")
                .title_bottom(Line::from(" Press ? or Esc to close ").centered()),
        );

    f.render_widget(paragraph, area);
}
