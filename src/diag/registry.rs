//! Registry of the dashboard's own threads.
//!
//! Each long-lived thread registers itself and keeps a small activity stack
//! up to date. `render_dump` prints the registry in the same block format the
//! sampler parses, so the dashboard can monitor itself.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

#[derive(Debug)]
struct ThreadEntry {
    name: String,
    state: String,
    activities: Vec<&'static str>,
    since: Instant,
}

/// Shared, thread-safe registry.
#[derive(Debug)]
pub struct ThreadRegistry {
    next_id: AtomicU64,
    threads: Mutex<BTreeMap<u64, ThreadEntry>>,
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            threads: Mutex::new(BTreeMap::new()),
        }
    }
}

impl ThreadRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers the calling thread. The entry lives as long as the probe.
    pub fn register(self: &Arc<Self>, name: impl Into<String>) -> ThreadProbe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(
            id,
            ThreadEntry {
                name: name.into(),
                state: "running".to_string(),
                activities: Vec::new(),
                since: Instant::now(),
            },
        );
        ThreadProbe {
            registry: Arc::clone(self),
            id,
        }
    }

    /// Number of registered threads.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Renders all threads as a dump, one block per thread.
    pub fn render_dump(&self) -> String {
        let threads = self.lock();
        let mut out = String::new();
        for (id, entry) in threads.iter() {
            let _ = writeln!(out, "thread {} [{}]:", id, entry.state);
            for activity in entry.activities.iter().rev() {
                let _ = writeln!(out, "{}", activity);
            }
            let _ = writeln!(out, "spawned as {}", entry.name);
            let _ = writeln!(out, "\tin state for {:.1}s", entry.since.elapsed().as_secs_f64());
            out.push('\n');
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<u64, ThreadEntry>> {
        self.threads.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle a thread uses to report what it is doing.
#[derive(Debug)]
pub struct ThreadProbe {
    registry: Arc<ThreadRegistry>,
    id: u64,
}

impl ThreadProbe {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Sets the state label. The "in state for" timer restarts on change.
    pub fn set_state(&self, state: &str) {
        let mut threads = self.registry.lock();
        if let Some(entry) = threads.get_mut(&self.id)
            && entry.state != state
        {
            entry.state = state.to_string();
            entry.since = Instant::now();
        }
    }

    /// Pushes an activity frame; it is popped when the guard drops.
    pub fn enter(&self, activity: &'static str) -> ActivityGuard<'_> {
        if let Some(entry) = self.registry.lock().get_mut(&self.id) {
            entry.activities.push(activity);
        }
        ActivityGuard { probe: self }
    }
}

impl Drop for ThreadProbe {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

/// Pops its activity frame on drop.
#[derive(Debug)]
pub struct ActivityGuard<'a> {
    probe: &'a ThreadProbe,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        if let Some(entry) = self.probe.registry.lock().get_mut(&self.probe.id) {
            entry.activities.pop();
        }
    }
}
