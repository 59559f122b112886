// Views module - frame-level rendering
//
// The panel has a single screen; this module lays it out and stacks the
// overlays (help modal, flash toast) on top.

mod help;

use super::app::App;
use super::modal::Modal;
use crate::service::SessionService;
use crate::tui::components;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

/// Height of the logs pane, borders included
const LOGS_HEIGHT: u16 = 8;

/// Main UI render function - called on every frame
pub fn draw<S: SessionService>(f: &mut Frame, app: &App<S>) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(LOGS_HEIGHT),
            Constraint::Length(2),
        ])
        .split(f.area());

    components::title_bar::render(f, chunks[0], app);
    components::buttons::render(f, chunks[1], app);
    components::lists_panel::render(f, chunks[2], app);
    components::logs_panel::render(f, chunks[3], app);
    components::status_bar::render(f, chunks[4], app);

    if let Some(Modal::Help) = app.modal {
        help::render(f, app);
    }

    // Flash toast goes on top of the modal too
    if let Some(flash) = app.current_flash() {
        components::toast::render(f, f.area(), &flash, &app.theme);
    }
}
