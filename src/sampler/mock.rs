//! In-memory dump source for tests and offline runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{DumpSource, SampleError};

/// Replays queued responses in order.
///
/// Once the queue is drained the last response is repeated, so a source
/// seeded with one dump behaves like a target that never changes. Clones
/// share the queue, letting a test keep a handle after the source has been
/// moved into a fetch worker.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    inner: Arc<Mutex<MockInner>>,
}

#[derive(Debug, Default)]
struct MockInner {
    queue: VecDeque<Result<String, SampleError>>,
    last: Option<Result<String, SampleError>>,
    fetches: usize,
}

impl MockSource {
    /// Creates a source with nothing queued; fetching fails until fed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source pre-loaded with dumps.
    pub fn with_dumps<I, S>(dumps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        for dump in dumps {
            source.push_dump(dump);
        }
        source
    }

    pub fn push_dump(&self, dump: impl Into<String>) {
        self.lock().queue.push_back(Ok(dump.into()));
    }

    pub fn push_error(&self, error: SampleError) {
        self.lock().queue.push_back(Err(error));
    }

    /// Number of fetches served so far.
    pub fn fetches(&self) -> usize {
        self.lock().fetches
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DumpSource for MockSource {
    fn fetch(&mut self) -> Result<String, SampleError> {
        let mut inner = self.lock();
        inner.fetches += 1;
        if let Some(next) = inner.queue.pop_front() {
            inner.last = Some(next);
        }
        inner
            .last
            .clone()
            .unwrap_or_else(|| Err(SampleError::Transport("mock source is empty".into())))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
