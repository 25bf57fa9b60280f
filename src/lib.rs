//! rtmon - terminal monitor for execution-state dumps.
//!
//! The library holds everything the `rtmon` binary wires together:
//! - `sampler` - fetching and parsing dumps
//! - `scheduler` - the background refresh ticker
//! - `tui` - grid state, input dispatch and rendering
//! - `diag` - optional self-diagnostics endpoint

pub mod config;
pub mod diag;
pub mod sampler;
pub mod scheduler;
pub mod tui;
