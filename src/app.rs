//! Dashboard loop.
//!
//! The UI thread owns the [`AggregateStore`] and is the only consumer of the
//! poller event stream. Each pass drains whatever events have arrived,
//! decides whether to repaint, then waits at most [`INPUT_POLL`] for a key.
//! It never blocks on remote I/O.

use crate::error::Result;
use crate::input::{Action, InputHandler};
use crate::poller::HostEvent;
use crate::state::AggregateStore;
use crate::theme::Palette;
use crate::ui;

use chrono::Local;
use crossterm::event;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::io::{self, stdout};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Longest wait for terminal input per pass.
pub const INPUT_POLL: Duration = Duration::from_millis(100);

/// What the loop does on this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Nothing changed; keep waiting.
    Idle,
    /// Draw a new frame.
    Repainting,
}

/// Decides whether to repaint.
///
/// Repaints when new events arrived, when the terminal was resized, or when
/// the last repaint is older than `refresh` so the clock keeps moving.
#[must_use]
pub fn next_state(
    drained: usize,
    since_last: Duration,
    refresh: Duration,
    resized: bool,
) -> LoopState {
    if drained > 0 || resized || since_last >= refresh {
        LoopState::Repainting
    } else {
        LoopState::Idle
    }
}

/// The full-screen dashboard.
#[derive(Debug)]
pub struct Dashboard {
    store: AggregateStore,
    events: Receiver<HostEvent>,
    refresh: Duration,
    input: InputHandler,
    palette: Palette,
    last_paint: Option<Instant>,
    resized: bool,
    should_quit: bool,
}

impl Dashboard {
    /// Creates a dashboard for `hosts` fed by `events`.
    pub fn new<I, S>(hosts: I, events: Receiver<HostEvent>, refresh: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store: AggregateStore::new(hosts),
            events,
            refresh,
            input: InputHandler::new(),
            palette: Palette::default(),
            last_paint: None,
            resized: false,
            should_quit: false,
        }
    }

    /// Current store contents.
    #[must_use]
    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    /// Returns true once a quit action was handled.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Absorbs every event that is already waiting. Returns how many were newer
    /// than what the store held.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if self.store.absorb(event) {
                        applied += 1;
                    }
                }
                // All pollers gone; keep showing what we have.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }

    /// Applies an input action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Resize => self.resized = true,
            Action::None => {}
        }
    }

    /// One pass without input: drain, decide, maybe repaint.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing to the terminal fails.
    pub fn tick<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<LoopState> {
        let drained = self.drain();
        let since_last = self.last_paint.map_or(Duration::MAX, |t| t.elapsed());
        let state = next_state(drained, since_last, self.refresh, self.resized);

        if state == LoopState::Repainting {
            if self.resized {
                terminal.autoresize()?;
                terminal.clear()?;
                self.resized = false;
            }
            let store = &self.store;
            let palette = &self.palette;
            let mut omitted = 0;
            terminal.draw(|f| omitted = ui::draw(f, store, palette, Local::now()).omitted)?;
            if omitted > 0 {
                debug!(omitted, "hosts did not fit on screen");
            }
            self.last_paint = Some(Instant::now());
        }
        Ok(state)
    }

    /// Takes over the terminal and runs until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, input, or rendering fails.
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let result = self.main_loop(&mut terminal);

        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!(hosts = self.store.len(), "dashboard started");
        loop {
            self.tick(terminal)?;

            if event::poll(INPUT_POLL)? {
                let action = self.input.handle_event(&event::read()?);
                self.handle_action(action);
            }

            if self.should_quit {
                info!("quit requested");
                return Ok(());
            }
        }
    }
}
