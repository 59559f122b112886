// Session buttons component
//
// Two side-by-side boxes, one per button slot. An idle button shows its
// label; a prompting button shows the text field with its placeholder and
// the prompt step.

use crate::panel::button::{ButtonAutomaton, ButtonSlot};
use crate::service::SessionService;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render<S: SessionService>(f: &mut Frame, area: Rect, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (slot, chunk) in [ButtonSlot::First, ButtonSlot::Second].into_iter().zip(chunks.iter()) {
        render_button(f, *chunk, slot, app.panel.buttons().get(slot), &app.theme);
    }
}

fn slot_key(slot: ButtonSlot) -> char {
    match slot {
        ButtonSlot::First => '1',
        ButtonSlot::Second => '2',
    }
}

fn render_button(
    f: &mut Frame,
    area: Rect,
    slot: ButtonSlot,
    button: &ButtonAutomaton,
    theme: &Theme,
) {
    let descriptor = button.descriptor();

    let (border_color, label_style) = if button.is_disabled() {
        (theme.muted, Style::default().fg(theme.muted))
    } else if button.is_prompting() {
        (
            theme.highlight,
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            theme.border,
            Style::default().fg(theme.foreground).add_modifier(Modifier::BOLD),
        )
    };

    let body = match button.placeholder() {
        Some(placeholder) => {
            let step = button.collected().len() + 1;
            let total = descriptor.prompts.len();
            let field = if button.field().is_empty() {
                Span::styled(placeholder, Style::default().fg(theme.muted))
            } else {
                Span::styled(button.field(), Style::default().fg(theme.foreground))
            };
            Line::from(vec![
                Span::styled(format!("{}/{} ", step, total), Style::default().fg(theme.muted)),
                field,
                Span::styled("▏", Style::default().fg(theme.highlight)),
            ])
        }
        None if button.is_disabled() => Line::from(Span::styled("owner only", label_style)),
        None => Line::from(Span::styled(
            format!("press {}", slot_key(slot)),
            Style::default().fg(theme.muted),
        )),
    };

    let paragraph = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(
                format!(" [{}] {} ", slot_key(slot), descriptor.text),
                label_style,
            )),
    );

    f.render_widget(paragraph, area);
}
