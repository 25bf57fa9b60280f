//! Self-diagnostics: lets the dashboard expose a dump of its own threads.

mod registry;
mod server;

pub use registry::{ActivityGuard, ThreadProbe, ThreadRegistry};
pub use server::{router, spawn_server};

use thiserror::Error;

/// Default address of the self-diagnostic server.
pub const DEFAULT_ADDR: &str = "127.0.0.1:1234";

#[derive(Debug, Error)]
pub enum DiagError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
