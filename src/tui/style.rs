//! Color scheme and styles.

use ratatui::style::{Color, Modifier, Style};

/// Dashboard palette.
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Reset;
    pub const HEADER_BG: Color = Color::Blue;
    pub const SELECTED_BG: Color = Color::DarkGray;

    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;
    pub const HEADER_FG: Color = Color::White;

    pub const LIVE: Color = Color::Green;
    pub const PAUSED: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const ACCENT: Color = Color::Cyan;
}

/// Pre-defined styles.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Theme::FG).bg(Theme::BG)
    }

    /// Footer bar style.
    pub fn footer() -> Style {
        Style::default().fg(Theme::HEADER_FG).bg(Theme::HEADER_BG)
    }

    /// Selected row style.
    pub fn selected() -> Style {
        Style::default()
            .bg(Theme::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Table header style.
    pub fn table_header() -> Style {
        Style::default()
            .fg(Theme::HEADER_FG)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// State column.
    pub fn state() -> Style {
        Style::default().fg(Theme::ACCENT)
    }

    /// Expanded trace lines.
    pub fn trace() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    pub fn live() -> Style {
        Style::default()
            .fg(Theme::LIVE)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn paused() -> Style {
        Style::default()
            .fg(Theme::PAUSED)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Theme::ERROR)
            .bg(Theme::HEADER_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Dimmed text style.
    pub fn dim() -> Style {
        Style::default().fg(Theme::FG_DIM)
    }

    /// Help key style.
    pub fn help_key() -> Style {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    }

    /// Popup border.
    pub fn border() -> Style {
        Style::default().fg(Theme::ACCENT)
    }
}
