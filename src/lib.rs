//! # machines-monitor
//!
//! Terminal dashboard for a fleet of accelerator hosts.
//!
//! Each configured host gets a poller thread that keeps one persistent shell
//! session open over ssh and collects CPU, memory, GPU/XPU device and process
//! metrics every refresh interval. Results flow over a single channel to the
//! UI thread, which lays the hosts out in a grid of panels.
//!
//! ```text
//! poller (per host) ──HostEvent──▶ Dashboard ──▶ AggregateStore ──▶ ui::draw
//!    │                                                 (layout + panels)
//!    └─ RemoteSession ── ssh ── remote shell
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use machines_monitor::{poller, Config, Dashboard};
//! use std::sync::mpsc;
//!
//! let config = Config::load("configs/machines.yaml")?;
//! let (tx, rx) = mpsc::channel();
//! poller::spawn_all(&config, &tx)?;
//! let hosts = config.machines.iter().map(|m| m.host.clone());
//! Dashboard::new(hosts, rx, config.refresh_interval()).run()?;
//! ```

#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Error Types
// ============================================================================

pub mod error;
pub use error::{CollectError, ConnectError, MonitorError, Result, SessionError};

// ============================================================================
// Core Types
// ============================================================================

pub mod config;
pub mod types;

pub use config::{Config, SessionConfig};
pub use types::{DeviceKind, DeviceMetric, Host, MemoryInfo, ProcessInfo, Snapshot};

// ============================================================================
// Remote Sessions
// ============================================================================

pub mod protocol;
pub mod session;

pub use session::{
    CommandRunner, LocalShell, RemoteSession, SessionState, SessionTimeouts, SshTransport,
    Transport,
};

// ============================================================================
// Collection
// ============================================================================

pub mod collectors;
pub mod poller;
pub mod state;

pub use collectors::MetricCollector;
pub use poller::{HostEvent, PollOutcome, Poller};
pub use state::{AggregateStore, HostStatus};

// ============================================================================
// Dashboard
// ============================================================================

pub mod app;
pub mod input;
pub mod layout;
pub mod panels;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{Dashboard, LoopState};
pub use layout::{GridLayout, LayoutEngine};

// ============================================================================
// Logging
// ============================================================================

pub mod logging;

#[cfg(test)]
mod testing;

// Re-export ratatui so integration tests use the same version.
pub use ratatui;
