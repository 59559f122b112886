// Logs panel component
//
// Shows the newest captured log entries that fit, color-coded by level.

use crate::logging::{LogEntry, LogLevel};
use crate::service::SessionService;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn render<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;
    let visible = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = app
        .log_buffer
        .recent(visible)
        .iter()
        .map(|entry| ListItem::new(format_log_entry(entry)).style(log_level_style(&entry.level, theme)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" Logs ({}) ", app.log_buffer.len())),
    );

    f.render_widget(list, area);
}

fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "[{}] {:5} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.message
    )
}

fn log_level_style(level: &LogLevel, theme: &Theme) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(theme.error),
        LogLevel::Warn => Style::default().fg(theme.warn),
        LogLevel::Info => Style::default().fg(theme.foreground),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(theme.muted),
    }
}
