// Title bar component
//
// Renders the app title with the session the pedal is in and its role.

use crate::service::SessionService;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;
    let snapshot = app.panel.snapshot();

    let session = match &snapshot.session_id {
        Some(id) => Span::styled(
            format!("session {} ({})", id, snapshot.role()),
            Style::default().fg(theme.highlight),
        ),
        None => Span::styled("offline", Style::default().fg(theme.muted)),
    };

    let title = Line::from(vec![
        Span::styled(
            " ∞ Strangeloop ──── ",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        ),
        session,
    ]);

    let paragraph = Paragraph::new(title).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.title))
            .title_top(Line::from(" ? ").right_aligned()),
    );

    f.render_widget(paragraph, area);
}
