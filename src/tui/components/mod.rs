// Components module - UI building blocks
//
// Every frame renders the same shell:
// - Title bar: session id and role
// - Buttons: the two session buttons and their prompt fields
// - Lists: loops or members, whichever is focused
// - Logs panel: captured tracing output
// - Status bar: uptime, pedal address, key hints
// - Toast: the current flash message

pub mod buttons;
pub mod lists_panel;
pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;
