// TUI application state
//
// Wraps the control panel with what only the screen needs: the loop cursor,
// the help modal, theme, and the log buffer fed by the tracing layer.

use super::modal::Modal;
use super::theme::{Theme, ThemeKind};
use crate::config::Config;
use crate::flash::FlashMessage;
use crate::logging::LogBuffer;
use crate::panel::Panel;
use crate::service::SessionService;
use std::time::{Duration, Instant};

/// Spinner frames marking the loop that is playing
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Main application state for the TUI
pub struct App<S> {
    pub panel: Panel<S>,

    /// Captured tracing output for the logs pane
    pub log_buffer: LogBuffer,

    pub theme: Theme,

    /// Active modal overlay, if any
    pub modal: Option<Modal>,

    pub should_quit: bool,

    /// Cursor into the loop list (position, not loop index)
    pub cursor: usize,

    /// Base URL shown in the status bar
    pub pedal_url: String,

    pub poll_interval: Duration,

    flash_duration: Duration,
    start_time: Instant,
    frame: usize,
}

impl<S: SessionService> App<S> {
    pub fn new(panel: Panel<S>, log_buffer: LogBuffer, pedal_url: String, config: &Config) -> Self {
        Self {
            panel,
            log_buffer,
            theme: ThemeKind::from_name(&config.theme).theme(),
            modal: None,
            should_quit: false,
            cursor: 0,
            pedal_url,
            poll_interval: config.poll_interval,
            flash_duration: config.flash_duration,
            start_time: Instant::now(),
            frame: 0,
        }
    }

    /// Loop under the cursor, if the list is not empty
    pub fn selected_loop(&self) -> Option<u32> {
        let loops = self.panel.loops();
        if loops.is_empty() {
            return None;
        }
        loops.iter().nth(self.cursor.min(loops.len() - 1)).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.panel.loops().len();
        if len > 0 {
            self.cursor = (self.cursor + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor inside the loop list after a poll shrank it
    pub fn clamp_cursor(&mut self) {
        let len = self.panel.loops().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Flash message currently on screen
    pub fn current_flash(&self) -> Option<FlashMessage> {
        self.panel.flash().latest(self.flash_duration)
    }

    /// Called on every redraw tick
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.panel.flash().prune(self.flash_duration);
        self.clamp_cursor();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.frame % SPINNER.len()]
    }

    pub fn uptime(&self) -> String {
        let seconds = self.start_time.elapsed().as_secs();
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;

        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}
