//! Refresh scheduling.
//!
//! The ticker thread wakes on a short fixed tick and, when the coarse
//! refresh interval has elapsed, only *signals* the foreground loop with
//! `Event::RefreshDue`. Fetching, reconciling and drawing all stay on the
//! foreground. `ScheduleState` is the single piece of state both sides
//! touch, so every field in it is atomic.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

use crate::diag::ThreadRegistry;
use crate::tui::event::Event;

/// How often the ticker wakes up to check the refresh threshold.
pub const TICK: Duration = Duration::from_millis(500);

const NEVER: u64 = u64::MAX;

/// Pause flag, refresh timestamp, interval and the in-flight gate.
#[derive(Debug)]
pub struct ScheduleState {
    origin: Instant,
    paused: AtomicBool,
    /// Nanoseconds since `origin`, or `NEVER`.
    last_refresh_ns: AtomicU64,
    interval_secs: AtomicU64,
    in_flight: AtomicBool,
}

impl ScheduleState {
    /// An interval of zero starts paused.
    pub fn new(interval_secs: u64) -> Self {
        Self {
            origin: Instant::now(),
            paused: AtomicBool::new(interval_secs == 0),
            last_refresh_ns: AtomicU64::new(NEVER),
            interval_secs: AtomicU64::new(interval_secs),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    /// Flips the pause flag and returns the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.load(Ordering::Acquire))
    }

    pub fn set_interval(&self, secs: u64) {
        self.interval_secs.store(secs, Ordering::Release);
    }

    /// Records a completed refresh at `now`.
    pub fn mark_refreshed(&self, now: Instant) {
        let ns = now.saturating_duration_since(self.origin).as_nanos();
        let ns = u64::try_from(ns).unwrap_or(NEVER - 1);
        self.last_refresh_ns.store(ns, Ordering::Release);
    }

    /// Time elapsed since the last refresh, `None` if there was none.
    pub fn since_last_refresh(&self, now: Instant) -> Option<Duration> {
        let ns = self.last_refresh_ns.load(Ordering::Acquire);
        if ns == NEVER {
            return None;
        }
        let at = self.origin + Duration::from_nanos(ns);
        Some(now.saturating_duration_since(at))
    }

    /// Whether the timer should request a refresh at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.is_paused() || self.is_in_flight() {
            return false;
        }
        let interval = self.interval();
        if interval.is_zero() {
            return false;
        }
        self.since_last_refresh(now)
            .is_none_or(|elapsed| elapsed >= interval)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claims the refresh gate. Returns `false` if a poll is already running.
    pub fn try_begin_refresh(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases the refresh gate.
    pub fn finish_refresh(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

struct Ticker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Signals the thread and waits for it. Returns `false` if it panicked.
    fn join(self) -> bool {
        let _ = self.stop_tx.send(());
        match self.handle.join() {
            Ok(()) => true,
            Err(_) => {
                error!("ticker thread panicked, automatic refresh stopped");
                false
            }
        }
    }
}

/// Owns the background ticker thread.
pub struct Scheduler {
    state: Arc<ScheduleState>,
    tx: Sender<Event>,
    registry: Arc<ThreadRegistry>,
    tick: Duration,
    ticker: Option<Ticker>,
}

impl Scheduler {
    pub fn new(state: Arc<ScheduleState>, tx: Sender<Event>, registry: Arc<ThreadRegistry>) -> Self {
        Self {
            state,
            tx,
            registry,
            tick: TICK,
            ticker: None,
        }
    }

    /// Overrides the wake-up period.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn state(&self) -> &Arc<ScheduleState> {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Starts the ticker. Does nothing if it is already running.
    pub fn start(&mut self) -> io::Result<()> {
        if self.ticker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let state = Arc::clone(&self.state);
        let tx = self.tx.clone();
        let registry = Arc::clone(&self.registry);
        let tick = self.tick;

        let handle = thread::Builder::new()
            .name("rtmon-ticker".to_string())
            .spawn(move || {
                let probe = registry.register("rtmon-ticker");
                let _frame = probe.enter("rtmon::scheduler::Scheduler::start");
                loop {
                    probe.set_state("sleep");
                    match stop_rx.recv_timeout(tick) {
                        Err(RecvTimeoutError::Timeout) => {}
                        // Stop requested or scheduler dropped.
                        _ => break,
                    }
                    if state.is_due(Instant::now()) {
                        probe.set_state("signalling");
                        trace!("refresh due");
                        if tx.send(Event::RefreshDue).is_err() {
                            break;
                        }
                    }
                }
            })?;

        debug!("ticker started");
        self.ticker = Some(Ticker { stop_tx, handle });
        Ok(())
    }

    /// Stops the ticker and waits for the thread to exit.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            if ticker.join() {
                debug!("ticker stopped");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
