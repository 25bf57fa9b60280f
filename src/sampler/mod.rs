//! Sampling of execution-state dumps.
//!
//! A `Sampler` pulls the raw dump text from a `DumpSource` (normally the
//! monitored process's debug endpoint over HTTP) and turns it into a list of
//! `ExecutionUnitRecord`s. Malformed blocks are skipped; only a transport
//! failure or a dump with no usable block at all is reported as an error.

mod http;
pub mod mock;
mod parser;

pub use http::HttpSource;
pub use parser::{ParsedDump, parse_dump};

use thiserror::Error;
use tracing::{debug, warn};

/// One execution unit as seen in a single dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionUnitRecord {
    /// Stable numeric identifier of the unit.
    pub id: u64,
    /// Short state label, e.g. `running` or `chan receive`.
    pub state: String,
    /// Stack frames, innermost first. Frame pairs are already joined.
    pub frames: Vec<String>,
}

impl ExecutionUnitRecord {
    /// Human-readable description: the first frame, or empty if there is none.
    pub fn description(&self) -> &str {
        self.frames.first().map(String::as_str).unwrap_or("")
    }
}

/// Errors that abort a single refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// Request failed or timed out.
    #[error("transport error: {0}")]
    Transport(String),
    /// Endpoint answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// Dump was non-empty but no block could be parsed.
    #[error("no valid records in dump ({defects} malformed blocks)")]
    TotalParseFailure { defects: usize },
}

/// Source of raw dump text.
///
/// Object-safe so the fetch worker can own a `Box<dyn DumpSource>`.
pub trait DumpSource: Send {
    /// Fetches one raw dump.
    fn fetch(&mut self) -> Result<String, SampleError>;

    /// Where dumps come from, for logs and the status line.
    fn describe(&self) -> String;
}

/// Fetches and parses dumps.
pub struct Sampler {
    source: Box<dyn DumpSource>,
    polls: u64,
}

impl Sampler {
    pub fn new(source: Box<dyn DumpSource>) -> Self {
        Self { source, polls: 0 }
    }

    /// Target description of the underlying source.
    pub fn target(&self) -> String {
        self.source.describe()
    }

    /// Number of `poll` calls made so far, successful or not.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Fetches one dump and parses it.
    pub fn poll(&mut self) -> Result<Vec<ExecutionUnitRecord>, SampleError> {
        self.polls += 1;
        let text = self.source.fetch().inspect_err(|e| {
            warn!("fetch from {} failed: {}", self.source.describe(), e);
        })?;

        let parsed = parse_dump(&text);
        if parsed.defects > 0 {
            debug!("skipped {} malformed blocks", parsed.defects);
        }
        if parsed.records.is_empty() && !text.trim().is_empty() {
            warn!(
                "dump from {} had no valid records ({} malformed blocks)",
                self.source.describe(),
                parsed.defects
            );
            return Err(SampleError::TotalParseFailure {
                defects: parsed.defects,
            });
        }

        debug!("sampled {} execution units", parsed.records.len());
        Ok(parsed.records)
    }
}
