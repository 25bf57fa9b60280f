//! Application state owned by the foreground loop.

use std::time::Duration;

use chrono::{DateTime, Local};
use ratatui::widgets::TableState as RatatuiTableState;

use super::mode::Mode;
use super::rows::RowStore;

/// Everything the renderer reads.
///
/// `paused`, `interval` and `in_flight` are copies of the shared schedule
/// taken right before each draw.
#[derive(Debug, Default)]
pub struct AppState {
    pub rows: RowStore,
    pub mode: Mode,
    /// Polled URL, shown in the grid title.
    pub target: String,
    pub paused: bool,
    pub interval: Duration,
    pub in_flight: bool,
    /// Wall time of the last successful refresh.
    pub last_refresh_at: Option<DateTime<Local>>,
    /// Last poll failure, cleared by the next success.
    pub last_error: Option<String>,
    /// Kept across draws so ratatui can keep the cursor row in view.
    pub grid_table_state: RatatuiTableState,
}

impl AppState {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }
}
