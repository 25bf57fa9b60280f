//! Terminal user interface for rtmon.
//!
//! A full-screen grid of execution units refreshed in place, with a
//! full-screen trace view and a help popup.

mod app;
pub mod event;
mod fetch;
pub mod input;
pub mod mode;
mod render;
pub mod rows;
mod state;
mod style;
mod widgets;

pub use app::App;
pub use event::{Event, EventHandler};
pub use fetch::FetchWorker;
pub use input::{Action, InputEvent, route};
pub use mode::{Mode, TraceView};
pub use rows::{RowStore, SortKey, Widget};
pub use state::AppState;
