//! Flash toast component
//!
//! Renders the current flash message in the bottom-right corner, on top of
//! all other content. Expiry is owned by the flash handle.

use crate::flash::{FlashLevel, FlashMessage};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Toast rectangle for `message`, anchored bottom-right inside `area`
pub fn toast_area(message: &str, area: Rect) -> Rect {
    // 2 chars padding each side, borders included
    let width = (message.width() as u16).saturating_add(4).min(area.width.saturating_sub(4));
    let height = 3;

    let x = area.right().saturating_sub(width + 2);
    let y = area.bottom().saturating_sub(height + 2);
    Rect::new(x, y, width, height.min(area.height))
}

pub fn render(f: &mut Frame, area: Rect, flash: &FlashMessage, theme: &Theme) {
    let color = match flash.level {
        FlashLevel::Info => theme.info,
        FlashLevel::Error => theme.error,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme.background))
        .title(format!(" {} ", flash.level.as_str()));

    let text = Paragraph::new(flash.message.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.foreground))
        .block(block);

    let toast_area = toast_area(&flash.message, area);
    f.render_widget(Clear, toast_area);
    f.render_widget(text, toast_area);
}
