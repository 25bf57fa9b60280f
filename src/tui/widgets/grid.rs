//! Execution unit grid. Expanded rows show their trace below the description.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table};

use crate::tui::rows::{SortKey, Widget};
use crate::tui::state::AppState;
use crate::tui::style::Styles;

const MIN_ID_WIDTH: u16 = 4;
const MAX_STATE_WIDTH: u16 = 28;

/// Renders the grid with the cursor row highlighted.
pub fn render_grid(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let store = &state.rows;
    let sort_key = store.sort_key();

    let headers = ["ID", "STATE", "DESCRIPTION"]
        .iter()
        .enumerate()
        .map(|(col, h)| {
            let sorted = matches!(
                (col, sort_key),
                (0, SortKey::ById) | (1, SortKey::ByState)
            );
            let label = if sorted {
                format!("{}▲", h)
            } else {
                h.to_string()
            };
            Span::styled(label, Styles::table_header())
        })
        .collect::<Vec<_>>();
    let header = Row::new(headers).style(Styles::table_header()).height(1);

    let (id_width, state_width) = column_widths(store.rows());
    let rows: Vec<Row> = store.rows().map(grid_row).collect();

    let title = format!(" {} [{}] ", state.target, store.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(id_width),
            Constraint::Length(state_width),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Styles::selected());

    let selected = if store.is_empty() {
        None
    } else {
        Some(store.cursor())
    };
    state.grid_table_state.select(selected);

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(table, area, &mut state.grid_table_state);
}

fn grid_row(widget: &Widget) -> Row<'static> {
    let mut description = vec![Line::from(widget.description.clone())];
    if widget.expanded {
        description.extend(
            widget
                .trace_lines
                .iter()
                .map(|l| Line::styled(format!("  {}", l), Styles::trace())),
        );
    }

    Row::new(vec![
        Cell::from(widget.id.to_string()),
        Cell::from(Span::styled(widget.state.clone(), Styles::state())),
        Cell::from(Text::from(description)),
    ])
    .style(Styles::default())
    .height(u16::try_from(widget.height()).unwrap_or(u16::MAX))
}

/// Widths of the id and state columns, sized to content.
fn column_widths<'a>(widgets: impl Iterator<Item = &'a Widget>) -> (u16, u16) {
    let (id, state) = widgets.fold((0usize, 0usize), |(id, state), w| {
        (
            id.max(w.id.to_string().len()),
            state.max(w.state.chars().count()),
        )
    });
    let id = u16::try_from(id).unwrap_or(u16::MAX).max(MIN_ID_WIDTH) + 1;
    let state = u16::try_from(state)
        .unwrap_or(u16::MAX)
        .clamp(6, MAX_STATE_WIDTH)
        + 1;
    (id, state)
}
