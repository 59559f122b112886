// Theme system for the TUI
//
// A theme is a flat set of colors for every UI element. Themes are picked by
// name from the config (`theme = "dark"`); unknown names fall back to dark.

use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    Mono,
}

impl ThemeKind {
    /// Resolve a configured theme name (case-insensitive)
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "light" => ThemeKind::Light,
            "mono" | "monochrome" => ThemeKind::Mono,
            _ => ThemeKind::Dark,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "dark",
            ThemeKind::Light => "light",
            ThemeKind::Mono => "mono",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Mono => Theme::mono(),
        }
    }
}

/// Colors for all UI elements
#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_type: BorderType,
    pub title: Color,
    pub highlight: Color,
    pub selection: Color,
    pub selection_fg: Color,
    /// Marker for the loop that is playing
    pub playing: Color,
    pub info: Color,
    pub error: Color,
    pub warn: Color,
    pub status_bar: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_type: BorderType::Rounded,
            title: Color::Cyan,
            highlight: Color::Yellow,
            selection: Color::Rgb(60, 60, 90),
            selection_fg: Color::White,
            playing: Color::Green,
            info: Color::Cyan,
            error: Color::Red,
            warn: Color::Yellow,
            status_bar: Color::DarkGray,
        }
    }

    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            background: Color::Rgb(250, 250, 245),
            foreground: Color::Rgb(40, 40, 40),
            muted: Color::Rgb(150, 150, 150),
            border: Color::Rgb(180, 180, 180),
            border_type: BorderType::Rounded,
            title: Color::Rgb(0, 95, 135),
            highlight: Color::Rgb(175, 95, 0),
            selection: Color::Rgb(215, 225, 245),
            selection_fg: Color::Black,
            playing: Color::Rgb(0, 135, 0),
            info: Color::Rgb(0, 95, 135),
            error: Color::Rgb(175, 0, 0),
            warn: Color::Rgb(175, 95, 0),
            status_bar: Color::Rgb(120, 120, 120),
        }
    }

    pub fn mono() -> Self {
        Self {
            kind: ThemeKind::Mono,
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::DarkGray,
            border: Color::Reset,
            border_type: BorderType::Plain,
            title: Color::Reset,
            highlight: Color::White,
            selection: Color::White,
            selection_fg: Color::Black,
            playing: Color::White,
            info: Color::Reset,
            error: Color::White,
            warn: Color::Reset,
            status_bar: Color::DarkGray,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        ThemeKind::default().theme()
    }
}
