//! TUI widgets for rtmon.

mod footer;
mod grid;
mod help;
mod trace;

pub use footer::render_footer;
pub use grid::render_grid;
pub use help::render_help;
pub use trace::render_trace;
