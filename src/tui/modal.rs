// Modal system for TUI overlays
//
// Self-contained modal dialogs that handle their own input and return actions.
// App just holds Option<Modal>, input routing acts on returned ModalAction.

use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    /// Close the modal
    Close,
}

/// Available modal types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
}

impl Modal {
    pub fn help() -> Self {
        Modal::Help
    }

    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
        }
    }
}
