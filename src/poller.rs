//! Per-host polling workers.
//!
//! Every host gets its own thread that owns its session exclusively and
//! publishes one [`HostEvent`] per cycle on a shared `mpsc` channel. Workers
//! never talk to each other, so one slow or dead host cannot delay another.
//!
//! Lifecycle is fire-and-forget: workers are detached and are abandoned at
//! process exit. A worker stops on its own only when the first connect fails
//! or when nobody is listening any more.

use crate::collectors::MetricCollector;
use crate::config::Config;
use crate::session::{CommandRunner, RemoteSession, SessionTimeouts, SshTransport};
use crate::types::{Host, Snapshot};
use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

/// Result of one poll cycle.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// A complete snapshot.
    Snapshot(Snapshot),
    /// This cycle failed; polling continues.
    Failed(String),
    /// The first connect failed; polling has stopped for good.
    Unreachable(String),
}

/// One published poll result.
#[derive(Debug, Clone)]
pub struct HostEvent {
    /// Host identity.
    pub host: String,
    /// Cycle number, starting at 1 and increasing per host.
    pub cycle: u64,
    /// What the cycle produced.
    pub outcome: PollOutcome,
}

/// Drives one host's collection loop.
#[derive(Debug)]
pub struct Poller<R> {
    host: Host,
    runner: R,
    collector: MetricCollector,
    interval: Duration,
    events: Sender<HostEvent>,
}

impl<R: CommandRunner> Poller<R> {
    /// Creates a poller that owns `runner` for its whole life.
    pub fn new(host: Host, runner: R, interval: Duration, events: Sender<HostEvent>) -> Self {
        let collector = MetricCollector::new(&host);
        Self { host, runner, collector, interval, events }
    }

    /// Runs until the first connect fails or the receiver is dropped.
    ///
    /// Cycle order: connect once, then collect, publish, sleep.
    pub fn run(mut self) {
        if let Err(err) = self.runner.connect() {
            warn!(host = %self.host.host, error = %err, "host unreachable, not polling");
            let _ = self.publish(1, PollOutcome::Unreachable(err.to_string()));
            return;
        }
        info!(host = %self.host.host, "polling started");

        let mut cycle = 0;
        loop {
            cycle += 1;
            let outcome = match self.collector.collect(&mut self.runner) {
                Ok(snapshot) => PollOutcome::Snapshot(snapshot),
                Err(err) => {
                    warn!(host = %self.host.host, cycle, error = %err, "poll failed");
                    PollOutcome::Failed(err.to_string())
                }
            };

            if !self.publish(cycle, outcome) {
                info!(host = %self.host.host, "event stream closed, poller exiting");
                return;
            }
            thread::sleep(self.interval);
        }
    }

    fn publish(&self, cycle: u64, outcome: PollOutcome) -> bool {
        let event = HostEvent { host: self.host.host.clone(), cycle, outcome };
        self.events.send(event).is_ok()
    }
}

impl<R: CommandRunner + Send + 'static> Poller<R> {
    /// Starts the poller on a detached, named thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create the thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name(format!("poll-{}", self.host.host)).spawn(move || self.run())
    }
}

/// Spawns one ssh-backed poller per configured host.
///
/// # Errors
///
/// Returns an error if a worker thread cannot be created.
pub fn spawn_all(config: &Config, events: &Sender<HostEvent>) -> io::Result<Vec<JoinHandle<()>>> {
    let timeouts = SessionTimeouts::from(&config.session);
    config
        .machines
        .iter()
        .map(|host| {
            let transport = SshTransport::new(host.clone(), config.session.connect_timeout_secs);
            let session = RemoteSession::new(transport, timeouts);
            Poller::new(host.clone(), session, config.refresh_interval(), events.clone()).spawn()
        })
        .collect()
}
