// Status bar component
//
// Renders uptime, the pedal address, the poll period and key hints. The
// hints follow what the keyboard currently does.

use crate::service::SessionService;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>) {
    let hints = if app.panel.buttons().prompting().is_some() {
        "type │ Enter next │ Esc cancel"
    } else {
        "1/2 buttons │ Tab lists │ Space play │ d remove │ r record │ ? help │ q quit"
    };

    let status_text = format!(
        " {} │ {} │ poll {:.1}s │ {}",
        app.uptime(),
        app.pedal_url,
        app.poll_interval.as_secs_f32(),
        hints
    );

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}
