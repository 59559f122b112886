// Loops / members list component
//
// Shows whichever list has focus. The loop list carries the selection
// cursor and marks the loop that is playing.

use crate::panel::lists::Focus;
use crate::service::SessionService;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub fn render<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>) {
    let theme = &app.theme;
    let focus = app.panel.lists().focus();

    let tab = |target: Focus| {
        let style = if target == focus {
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        Span::styled(format!(" {} ", target.name()), style)
    };
    let title = Line::from(vec![tab(Focus::Loops), Span::raw("│"), tab(Focus::Members)]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(title);

    match focus {
        Focus::Loops => render_loops(f, area, app, block),
        Focus::Members => render_members(f, area, app, block),
    }
}

fn render_loops<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>, block: Block) {
    let theme = &app.theme;
    let playing = app.panel.playing();

    let items: Vec<ListItem> = app
        .panel
        .loops()
        .iter()
        .map(|&loop_index| {
            if playing == Some(loop_index) {
                ListItem::new(format!(" {} Loop {}", app.spinner_char(), loop_index))
                    .style(Style::default().fg(theme.playing).add_modifier(Modifier::BOLD))
            } else {
                ListItem::new(format!("   Loop {}", loop_index))
                    .style(Style::default().fg(theme.foreground))
            }
        })
        .collect();

    if items.is_empty() {
        render_empty(f, area, app, block, "No loops recorded. Press r to record.");
        return;
    }

    let mut state = ListState::default().with_selected(Some(app.cursor.min(items.len() - 1)));
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(theme.selection_fg)
            .bg(theme.selection)
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(list, area, &mut state);
}

fn render_members<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>, block: Block) {
    let members = app.panel.members();
    if members.is_empty() {
        let message = if app.panel.snapshot().is_active() {
            "No members yet."
        } else {
            "Not in a session."
        };
        render_empty(f, area, app, block, message);
        return;
    }

    let items: Vec<ListItem> = members
        .iter()
        .map(|name| ListItem::new(format!("   {}", name)))
        .collect();
    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(app.theme.foreground));
    f.render_widget(list, area);
}

fn render_empty<S: SessionService>(
    f: &mut Frame,
    area: Rect,
    app: &App<S>,
    block: Block,
    message: &str,
) {
    let paragraph = ratatui::widgets::Paragraph::new(format!(" {}", message))
        .style(Style::default().fg(app.theme.muted))
        .block(block);
    f.render_widget(paragraph, area);
}
