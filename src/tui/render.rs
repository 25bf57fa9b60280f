//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::mode::Mode;
use super::state::AppState;
use super::widgets::{render_footer, render_grid, render_help, render_trace};

/// Draws the view of the active mode.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    if let Mode::TraceDialog(view) = &state.mode {
        render_trace(frame, area, view);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Min(3),    // Grid
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_grid(frame, chunks[0], state);
    render_footer(frame, chunks[1], state);

    if state.mode == Mode::HelpDialog {
        render_help(frame, area);
    }
}
