//! Aggregate state for the dashboard.
//!
//! The UI thread is the only writer and the only reader, so the store needs no
//! locking. Each host keeps two views:
//!
//! - `latest`: the result of the most recent poll, `None` after a failed one
//! - `last_good`: the most recent snapshot ever received, which the renderer
//!   keeps showing (marked stale) while a host is failing

use crate::poller::{HostEvent, PollOutcome};
use crate::types::Snapshot;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// Health of a host as seen by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    /// Configured but nothing received yet.
    Pending,
    /// The last poll produced a snapshot.
    Live,
    /// The last poll failed; the reason is kept for display.
    Stale(String),
    /// The first connect failed; no further data will arrive.
    Unreachable(String),
}

/// Per-host state.
#[derive(Debug, Clone)]
pub struct HostEntry {
    latest: Option<Snapshot>,
    last_good: Option<Snapshot>,
    cycle: u64,
    status: HostStatus,
}

impl HostEntry {
    fn pending() -> Self {
        Self { latest: None, last_good: None, cycle: 0, status: HostStatus::Pending }
    }

    /// Snapshot from the most recent poll, `None` if it failed.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    /// Most recent snapshot ever received.
    #[must_use]
    pub fn last_good(&self) -> Option<&Snapshot> {
        self.last_good.as_ref()
    }

    /// Snapshot to draw: the latest one, or the last good one while failing.
    #[must_use]
    pub fn displayed(&self) -> Option<&Snapshot> {
        self.latest.as_ref().or(self.last_good.as_ref())
    }

    /// Returns true if the drawn snapshot is older than the last poll.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.latest.is_none() && self.last_good.is_some()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &HostStatus {
        &self.status
    }

    /// Cycle number of the last absorbed event.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns true once any event has been absorbed for this host.
    #[must_use]
    pub fn has_reported(&self) -> bool {
        self.status != HostStatus::Pending
    }
}

/// Latest state per host, fed only by poller events.
#[derive(Debug, Clone, Default)]
pub struct AggregateStore {
    hosts: BTreeMap<String, HostEntry>,
    last_event_at: Option<DateTime<Local>>,
}

impl AggregateStore {
    /// Creates a store with a pending entry for every configured host.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hosts = hosts.into_iter().map(|h| (h.into(), HostEntry::pending())).collect();
        Self { hosts, last_event_at: None }
    }

    /// Applies one event. Returns false if it was older than what is already stored.
    ///
    /// Last write wins per host; an event whose cycle is not newer than the
    /// stored one is ignored, so readers never see a host go back in time.
    pub fn absorb(&mut self, event: HostEvent) -> bool {
        let entry = self.hosts.entry(event.host).or_insert_with(HostEntry::pending);
        if event.cycle <= entry.cycle {
            return false;
        }
        entry.cycle = event.cycle;

        match event.outcome {
            PollOutcome::Snapshot(snapshot) => {
                entry.last_good = Some(snapshot.clone());
                entry.latest = Some(snapshot);
                entry.status = HostStatus::Live;
            }
            PollOutcome::Failed(reason) => {
                entry.latest = None;
                entry.status = HostStatus::Stale(reason);
            }
            PollOutcome::Unreachable(reason) => {
                entry.latest = None;
                entry.status = HostStatus::Unreachable(reason);
            }
        }

        self.last_event_at = Some(Local::now());
        true
    }

    /// Entry for `host`.
    #[must_use]
    pub fn get(&self, host: &str) -> Option<&HostEntry> {
        self.hosts.get(host)
    }

    /// Snapshot from the most recent poll of `host`.
    #[must_use]
    pub fn latest(&self, host: &str) -> Option<&Snapshot> {
        self.hosts.get(host).and_then(HostEntry::latest)
    }

    /// Entries ordered by host name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostEntry)> {
        self.hosts.iter().map(|(host, entry)| (host.as_str(), entry))
    }

    /// Number of known hosts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Returns true if no hosts are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Wall-clock time of the last absorbed event.
    #[must_use]
    pub fn last_event_at(&self) -> Option<DateTime<Local>> {
        self.last_event_at
    }
}
