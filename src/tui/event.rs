//! Event channel feeding the foreground loop.
//!
//! Terminal input is read on its own thread; the ticker and the fetch worker
//! post into the same channel through clones of `sender()`.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tracing::warn;

use crate::diag::ThreadRegistry;
use crate::sampler::{ExecutionUnitRecord, SampleError};

/// How long the input thread blocks before re-checking its stop flag.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
    /// The ticker decided a refresh is due.
    RefreshDue,
    /// A poll finished on the fetch worker.
    Sampled(Result<Vec<ExecutionUnitRecord>, SampleError>),
}

/// Owns the event channel and the terminal input thread.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
    input_stop: Option<Arc<AtomicBool>>,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            rx,
            tx,
            input_stop: None,
        }
    }

    /// Sender for producers other than the input thread.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Starts reading terminal events. Called once the terminal is in raw mode.
    pub fn spawn_input_reader(&mut self, registry: Arc<ThreadRegistry>) -> io::Result<()> {
        if self.input_stop.is_some() {
            return Ok(());
        }
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let tx = self.tx.clone();

        thread::Builder::new()
            .name("rtmon-input".to_string())
            .spawn(move || {
                let probe = registry.register("rtmon-input");
                let _frame = probe.enter("rtmon::tui::event::EventHandler::spawn_input_reader");
                probe.set_state("waiting for input");

                while !thread_stop.load(Ordering::Acquire) {
                    match event::poll(INPUT_POLL) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(e) => {
                            warn!("terminal poll failed: {}", e);
                            break;
                        }
                    }
                    let event = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => {
                            warn!("terminal read failed: {}", e);
                            break;
                        }
                    };
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            })?;

        self.input_stop = Some(stop);
        Ok(())
    }

    /// Receives the next event, blocking until one is available.
    pub fn next(&self) -> Result<Event, RecvError> {
        self.rx.recv()
    }

    /// Receives the next event, giving up after `timeout`.
    pub fn next_timeout(&self, timeout: Duration) -> Result<Event, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        if let Some(stop) = &self.input_stop {
            stop.store(true, Ordering::Release);
        }
    }
}
