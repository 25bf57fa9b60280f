//! Fetch worker: runs polls off the foreground loop.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use tracing::debug;

use crate::diag::ThreadRegistry;
use crate::sampler::Sampler;

use super::event::Event;

/// Handle to the worker thread. Each `request` runs exactly one poll whose
/// result comes back as `Event::Sampled`.
pub struct FetchWorker {
    job_tx: Sender<()>,
    target: String,
}

impl FetchWorker {
    pub fn spawn(
        mut sampler: Sampler,
        events: Sender<Event>,
        registry: Arc<ThreadRegistry>,
    ) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<()>();
        let target = sampler.target();

        thread::Builder::new()
            .name("rtmon-fetch".to_string())
            .spawn(move || {
                let probe = registry.register("rtmon-fetch");
                let _frame = probe.enter("rtmon::tui::fetch::FetchWorker::spawn");
                loop {
                    probe.set_state("idle");
                    // Ends once the worker handle is dropped.
                    if job_rx.recv().is_err() {
                        break;
                    }
                    probe.set_state("fetching");
                    let result = {
                        let _poll = probe.enter("rtmon::sampler::Sampler::poll");
                        sampler.poll()
                    };
                    if events.send(Event::Sampled(result)).is_err() {
                        break;
                    }
                }
                debug!("fetch worker exiting after {} polls", sampler.polls());
            })?;

        Ok(Self { job_tx, target })
    }

    /// Queues one poll. Returns `false` if the worker is gone.
    pub fn request(&self) -> bool {
        self.job_tx.send(()).is_ok()
    }

    /// Description of the polled target.
    pub fn target(&self) -> &str {
        &self.target
    }
}
