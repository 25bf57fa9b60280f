//! Help popup listing the key bindings.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::style::Styles;

const BINDINGS: &[(&str, &str)] = &[
    ("r", "manual refresh"),
    ("s", "toggle sort column and refresh"),
    ("p", "pause/unpause automatic updates"),
    ("↑ ↓ j k", "move cursor position"),
    ("Enter o", "expand trace under cursor (paused only)"),
    ("t", "open trace in full screen"),
    ("? h", "show this help"),
    ("Esc q", "exit"),
];

/// Renders the help popup centered on screen.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let content = help_lines();

    let popup_width = u16::try_from(u32::from(area.width) * 60 / 100)
        .unwrap_or(u16::MAX)
        .clamp(30, 60)
        .min(area.width);
    let popup_height = u16::try_from(content.len() + 4)
        .unwrap_or(u16::MAX)
        .min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(area.x + popup_x, area.y + popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" help ")
        .borders(Borders::ALL)
        .border_style(Styles::border());
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(Paragraph::new(content), chunks[0]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "press any key to close",
        Styles::dim(),
    )));
    frame.render_widget(footer, chunks[1]);
}

fn help_lines() -> Vec<Line<'static>> {
    BINDINGS
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!(" {:<9}", keys), Styles::help_key()),
                Span::raw(*what),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| render_help(frame, frame.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_help_on_very_wide_terminal() {
        let screen = draw(1200, 20);
        assert!(screen.contains("manual refresh"));
        assert!(screen.contains("press any key to close"));
    }

    #[test]
    fn test_help_on_narrow_terminal() {
        let screen = draw(20, 6);
        assert!(screen.contains("help"));
    }
}
