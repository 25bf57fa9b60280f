//! Status line under the grid.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::AppState;
use crate::tui::style::Styles;

/// Renders unit count, sort key, refresh mode, last refresh and last error.
pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let footer = Paragraph::new(footer_line(state)).style(Styles::footer());
    frame.render_widget(footer, area);
}

fn footer_line(state: &AppState) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!(" {} units ", state.rows.len())),
        Span::raw(format!("| sort: {} ", state.rows.sort_key().label())),
        Span::raw("| "),
    ];

    if state.paused {
        spans.push(Span::styled("PAUSED", Styles::paused()));
    } else if state.interval.is_zero() {
        spans.push(Span::styled("MANUAL", Styles::paused()));
    } else {
        spans.push(Span::styled(
            format!("LIVE {}s", state.interval.as_secs()),
            Styles::live(),
        ));
    }
    if state.in_flight {
        spans.push(Span::raw(" *"));
    }

    let refreshed = state
        .last_refresh_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    spans.push(Span::raw(format!(" | refreshed {} ", refreshed)));

    if let Some(err) = &state.last_error {
        spans.push(Span::styled(format!("| {} ", err), Styles::error()));
    }

    spans.push(Span::raw("| ? help"));
    Line::from(spans)
}
