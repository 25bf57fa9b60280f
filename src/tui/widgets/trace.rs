//! Full-screen trace of one execution unit.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::mode::TraceView;
use crate::tui::style::Styles;

pub fn render_trace(frame: &mut Frame, area: Rect, view: &TraceView) {
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

    let lines: Vec<Line> = view
        .lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                Line::styled(l.as_str(), Styles::state())
            } else {
                Line::from(l.as_str())
            }
        })
        .collect();

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .title(format!(" trace {} ", view.id)),
    );
    frame.render_widget(body, chunks[0]);

    let hint = Paragraph::new(" press any key to return").style(Styles::footer());
    frame.render_widget(hint, chunks[1]);
}
