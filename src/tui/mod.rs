// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, redraw ticks, panel events)
// - Key dispatch to the panel's buttons and lists

pub mod app;
pub mod components;
pub mod modal;
pub mod theme;
pub mod views;

use crate::config::Config;
use crate::flash::Flash;
use crate::logging::LogBuffer;
use crate::panel::button::ButtonSlot;
use crate::panel::lists::Focus;
use crate::panel::{Panel, PanelEvent, PANEL_EVENT_BUFFER};
use crate::service::SessionService;
use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI until the user quits
///
/// Sets up the terminal, mounts the panel, runs the event loop, and restores
/// the terminal whichever way the loop ends.
pub async fn run_tui<S: SessionService>(
    service: S,
    pedal_url: String,
    log_buffer: LogBuffer,
    config: Config,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::channel(PANEL_EVENT_BUFFER);
    let panel = Panel::new(Arc::new(service), Flash::new(), tx);
    let mut app = App::new(panel, log_buffer, pedal_url, &config);

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources with tokio::select!:
/// 1. Keyboard input
/// 2. Redraw ticks (spinner, flash expiry)
/// 3. Panel events (poll ticks and request completions)
///
/// The poll timer lives exactly as long as this function; returning, by
/// quitting or by error, drops it and stops polling.
async fn run_event_loop<S: SessionService>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    events: &mut mpsc::Receiver<PanelEvent>,
) -> Result<()> {
    let period = app.poll_interval;
    let _timer = app.panel.mount(period);
    let mut redraw = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = redraw.tick() => app.tick(),

            Some(event) = events.recv() => {
                app.panel.handle(event);
                app.clamp_cursor();
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Modal → Prompting button → Global keys
fn handle_key_event<S: SessionService>(app: &mut App<S>, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if handle_modal_input(app, key_event.code) {
        return;
    }

    if handle_prompt_input(app, key_event.code) {
        return;
    }

    handle_global_keys(app, key_event.code);
}

/// Modal captures all input when active
fn handle_modal_input<S: SessionService>(app: &mut App<S>, key: KeyCode) -> bool {
    let Some(ref mut modal) = app.modal else {
        return false;
    };
    if modal.handle_input(key) == ModalAction::Close {
        app.modal = None;
    }
    true
}

/// A prompting button owns the keyboard until it submits or resets
fn handle_prompt_input<S: SessionService>(app: &mut App<S>, key: KeyCode) -> bool {
    let Some(slot) = app.panel.buttons().prompting() else {
        return false;
    };

    match key {
        KeyCode::Enter => app.panel.activate_button(slot),
        KeyCode::Esc => app.panel.reset_button(slot),
        KeyCode::Backspace => app.panel.button_mut(slot).pop_char(),
        KeyCode::Char(c) => app.panel.button_mut(slot).push_char(c),
        // List navigation stays live; nothing else may reach the loops
        KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Up
        | KeyCode::Down => return false,
        _ => {}
    }
    true
}

fn handle_global_keys<S: SessionService>(app: &mut App<S>, key: KeyCode) {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::help()),

        KeyCode::Char('1') => app.panel.activate_button(ButtonSlot::First),
        KeyCode::Char('2') => app.panel.activate_button(ButtonSlot::Second),

        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            let target = app.panel.lists().focus().toggle();
            app.panel.set_focus(target);
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),

        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(loop_index) = focused_loop(app) {
                app.panel.toggle_playback(loop_index);
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(loop_index) = focused_loop(app) {
                app.panel.remove_loop(loop_index);
            }
        }
        KeyCode::Char('r') => app.panel.toggle_recording(),
        KeyCode::Char('u') => app.panel.update(),
        _ => {}
    }
}

/// Loop under the cursor, only while the loop list has focus
fn focused_loop<S: SessionService>(app: &App<S>) -> Option<u32> {
    if app.panel.lists().focus() != Focus::Loops {
        return None;
    }
    app.selected_loop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoPedal;
    use crate::panel::button::ButtonState;
    use crate::panel::tests::LocalPedal;
    use crate::service::http::PedalClient;
    use crossterm::event::KeyModifiers;

    fn test_app() -> App<PedalClient> {
        // Never contacted by these tests
        let client = PedalClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let (tx, _rx) = mpsc::channel(PANEL_EVENT_BUFFER);
        let panel = Panel::new(Arc::new(client), Flash::new(), tx);
        App::new(
            panel,
            LogBuffer::new(),
            "http://127.0.0.1:9".to_string(),
            &Config::default(),
        )
    }

    /// App over a seeded in-memory pedal, with loops 1 and 2 already polled
    async fn seeded_app() -> (App<LocalPedal>, Arc<LocalPedal>, mpsc::Receiver<PanelEvent>) {
        let service = Arc::new(LocalPedal::with(DemoPedal::seeded()));
        let (tx, mut rx) = mpsc::channel(PANEL_EVENT_BUFFER);
        let panel = Panel::new(Arc::clone(&service), Flash::new(), tx);
        let mut app = App::new(
            panel,
            LogBuffer::new(),
            "demo".to_string(),
            &Config::default(),
        );
        app.panel.update();
        settle(&mut app, &mut rx).await;
        assert_eq!(app.selected_loop(), Some(1));
        (app, service, rx)
    }

    async fn settle<S: SessionService>(app: &mut App<S>, rx: &mut mpsc::Receiver<PanelEvent>) {
        while let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await
        {
            app.panel.handle(event);
        }
    }

    fn press<S: SessionService>(app: &mut App<S>, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text<S: SessionService>(app: &mut App<S>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_prompting_button_captures_text() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.panel.buttons().prompting(), Some(ButtonSlot::Second));

        // 'q' and '1' are text while prompting
        type_text(&mut app, "q1ab");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.panel.buttons().get(ButtonSlot::Second).field(), "q1a");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.panel.buttons().prompting(), None);
        assert_eq!(app.panel.buttons().get(ButtonSlot::Second).field(), "");
    }

    #[tokio::test]
    async fn test_editing_keys_while_prompting_never_touch_loops() {
        let (mut app, service, mut rx) = seeded_app().await;
        press(&mut app, KeyCode::Char('1'));
        type_text(&mut app, "r");
        for code in [KeyCode::Delete, KeyCode::Home, KeyCode::End, KeyCode::Insert] {
            press(&mut app, code);
        }
        settle(&mut app, &mut rx).await;

        assert_eq!(service.commands(), 0);
        assert_eq!(app.panel.buttons().prompting(), Some(ButtonSlot::First));
        assert_eq!(app.panel.buttons().get(ButtonSlot::First).field(), "r");

        // Navigation still moves the loop cursor
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_loop(), Some(2));
    }

    #[tokio::test]
    async fn test_loop_keys_need_loop_focus() {
        let (mut app, service, mut rx) = seeded_app().await;
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel.lists().focus(), Focus::Members);
        for code in [
            KeyCode::Char('d'),
            KeyCode::Delete,
            KeyCode::Char(' '),
            KeyCode::Enter,
        ] {
            press(&mut app, code);
        }
        settle(&mut app, &mut rx).await;
        assert_eq!(service.commands(), 0);
        assert_eq!(app.panel.playing(), None);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('d'));
        settle(&mut app, &mut rx).await;
        assert_eq!(service.count("remove_loop"), 1);
    }

    #[tokio::test]
    async fn test_enter_advances_prompts() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        type_text(&mut app, "JAMS");
        press(&mut app, KeyCode::Enter);

        let join = app.panel.buttons().get(ButtonSlot::Second);
        assert_eq!(join.state(), ButtonState::Prompting { index: 1 });
        assert_eq!(join.placeholder(), Some("nickname"));
        assert_eq!(join.collected(), ["JAMS".to_string()]);
    }

    #[tokio::test]
    async fn test_escape_releases_keyboard_for_other_button() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('1'));
        type_text(&mut app, "ri");
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('2'));

        assert_eq!(app.panel.buttons().prompting(), Some(ButtonSlot::Second));
        assert_eq!(
            app.panel.buttons().get(ButtonSlot::First).state(),
            ButtonState::Idle
        );
    }

    #[tokio::test]
    async fn test_focus_keys_and_quit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.panel.lists().focus(), Focus::Members);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.panel.lists().focus(), Focus::Loops);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_help_modal_absorbs_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.modal, Some(Modal::Help));

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.panel.buttons().prompting(), None);

        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn test_list_keys_without_loops_do_nothing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.cursor, 0);
        assert_eq!(app.selected_loop(), None);
    }
}
