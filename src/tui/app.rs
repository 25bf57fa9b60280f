//! Main TUI application: the single foreground loop.
//!
//! Every event (key, resize, timer signal, finished poll) is handled to
//! completion before the next one is read. Only this loop touches the row
//! store, the mode and the terminal.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{debug, error, info, trace};

use crate::diag::ThreadRegistry;
use crate::sampler::{ExecutionUnitRecord, SampleError, Sampler};
use crate::scheduler::{ScheduleState, Scheduler};

use super::event::{Event, EventHandler};
use super::fetch::FetchWorker;
use super::input::{Action, InputEvent, route};
use super::mode::{Mode, TraceView};
use super::render::render;
use super::state::AppState;

/// Main TUI application.
pub struct App {
    state: AppState,
    schedule: Arc<ScheduleState>,
    scheduler: Scheduler,
    events: EventHandler,
    fetcher: FetchWorker,
    registry: Arc<ThreadRegistry>,
    needs_render: bool,
    force_clear: bool,
    should_quit: bool,
}

impl App {
    /// Creates the app and its fetch worker. An interval of zero starts paused.
    pub fn new(
        sampler: Sampler,
        interval_secs: u64,
        registry: Arc<ThreadRegistry>,
    ) -> io::Result<Self> {
        let events = EventHandler::new();
        let schedule = Arc::new(ScheduleState::new(interval_secs));
        let scheduler = Scheduler::new(
            Arc::clone(&schedule),
            events.sender(),
            Arc::clone(&registry),
        );
        let fetcher = FetchWorker::spawn(sampler, events.sender(), Arc::clone(&registry))?;

        Ok(Self {
            state: AppState::new(fetcher.target()),
            schedule,
            scheduler,
            events,
            fetcher,
            registry,
            needs_render: true,
            force_clear: false,
            should_quit: false,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn schedule(&self) -> &Arc<ScheduleState> {
        &self.schedule
    }

    pub fn is_ticker_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Sets up the terminal, runs the loop and restores the terminal.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self
            .events
            .spawn_input_reader(Arc::clone(&self.registry))
            .and_then(|()| self.run_loop(&mut terminal));

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// The foreground loop. Returns when the user quits.
    pub fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let probe = self.registry.register("main");
        let _frame = probe.enter("rtmon::tui::app::App::run_loop");
        info!("monitoring {}", self.state.target);

        self.start()?;
        while !self.should_quit {
            self.draw(terminal)?;

            probe.set_state("waiting for event");
            let Ok(event) = self.events.next() else {
                break;
            };
            probe.set_state("handling event");
            self.handle_event(event);
        }

        self.scheduler.stop();
        info!("quitting");
        Ok(())
    }

    /// Starts the ticker and issues the first refresh.
    pub fn start(&mut self) -> io::Result<()> {
        self.scheduler.start()?;
        self.request_refresh();
        self.needs_render = true;
        Ok(())
    }

    /// Redraws if anything changed since the last draw.
    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        if !self.needs_render {
            return Ok(());
        }
        if self.force_clear {
            terminal.clear()?;
            self.force_clear = false;
        }

        self.state.paused = self.schedule.is_paused();
        self.state.interval = self.schedule.interval();
        self.state.in_flight = self.schedule.is_in_flight();

        terminal.draw(|frame| render(frame, &mut self.state))?;
        self.needs_render = false;
        Ok(())
    }

    /// Handles one event to completion.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.dispatch(InputEvent::Key(key)),
            Event::Resize(_, _) => self.dispatch(InputEvent::Resize),
            Event::RefreshDue => self.on_refresh_due(),
            Event::Sampled(result) => self.apply_sample(result),
        }
    }

    fn dispatch(&mut self, input: InputEvent) {
        if let Some(action) = route(&self.state.mode, input) {
            trace!(?action, mode = self.state.mode.name(), "dispatch");
            self.perform(action);
        }
    }

    /// Executes one action against the current state.
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::CursorUp => {
                if self.state.rows.cursor_up() {
                    self.needs_render = true;
                }
            }
            Action::CursorDown => {
                if self.state.rows.cursor_down() {
                    self.needs_render = true;
                }
            }
            Action::Refresh => {
                self.request_refresh();
            }
            Action::ToggleSort => {
                let key = self.state.rows.toggle_sort();
                debug!("sort by {}", key.label());
                self.needs_render = true;
                self.request_refresh();
            }
            Action::TogglePause => {
                let paused = self.schedule.toggle_pause();
                info!("automatic refresh {}", if paused { "paused" } else { "resumed" });
                self.needs_render = true;
            }
            Action::ToggleExpand => {
                // Only on a frozen snapshot.
                if self.schedule.is_paused() && self.state.rows.toggle_show_trace() {
                    self.needs_render = true;
                }
            }
            Action::OpenTrace => {
                let view = self.state.rows.selected().map(|w| TraceView {
                    id: w.id,
                    lines: w.trace_lines.clone(),
                });
                if let Some(view) = view {
                    self.enter_mode(Mode::TraceDialog(view));
                }
            }
            Action::OpenHelp => self.enter_mode(Mode::HelpDialog),
            Action::Relayout => self.needs_render = true,
            Action::Close => self.return_to_main(),
            Action::Quit => self.should_quit = true,
        }
    }

    fn on_refresh_due(&mut self) {
        // The ticker may have signalled just before a pause, a manual
        // refresh or a mode switch; re-check on this side.
        if self.state.mode.is_modal() || !self.schedule.is_due(Instant::now()) {
            trace!("stale refresh signal dropped");
            return;
        }
        self.request_refresh();
    }

    /// Hands one poll to the fetch worker unless one is already running.
    fn request_refresh(&mut self) -> bool {
        if !self.schedule.try_begin_refresh() {
            debug!("refresh already in flight, request dropped");
            return false;
        }
        if !self.fetcher.request() {
            self.schedule.finish_refresh();
            error!("fetch worker is gone");
            self.state.last_error = Some("fetch worker stopped".to_string());
            self.needs_render = true;
            return false;
        }
        if !self.state.mode.is_modal() {
            self.needs_render = true;
        }
        true
    }

    /// Applies a finished poll. Failures leave rows untouched.
    fn apply_sample(&mut self, result: Result<Vec<ExecutionUnitRecord>, SampleError>) {
        self.schedule.finish_refresh();
        self.schedule.mark_refreshed(Instant::now());

        match result {
            Ok(records) => {
                self.state.rows.reconcile(&records);
                self.state.last_refresh_at = Some(Local::now());
                self.state.last_error = None;
            }
            Err(e) => {
                self.state.last_error = Some(e.to_string());
            }
        }

        if !self.state.mode.is_modal() {
            self.needs_render = true;
        }
    }

    /// Opens a dialog. The ticker is stopped before the dialog is drawn.
    fn enter_mode(&mut self, mode: Mode) {
        self.scheduler.stop();
        debug!("entering {} mode", mode.name());
        self.state.mode = mode;
        self.force_clear = true;
        self.needs_render = true;
    }

    /// Closes a dialog, restarts the ticker and forces a full redraw.
    fn return_to_main(&mut self) {
        if !self.state.mode.is_modal() {
            return;
        }
        debug!("leaving {} mode", self.state.mode.name());
        self.state.mode = Mode::Main;
        if let Err(e) = self.scheduler.start() {
            error!("cannot restart ticker: {}", e);
            self.state.last_error = Some(format!("ticker: {}", e));
        }
        self.force_clear = true;
        self.needs_render = true;
    }
}
