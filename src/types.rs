//! Core types for the fleet monitor.
//!
//! - [`Host`]: identity of one monitored machine, immutable after config load
//! - [`Snapshot`]: one complete, atomically published set of metrics for a host
//! - [`DeviceMetric`] / [`ProcessInfo`] / [`MemoryInfo`]: the parts of a snapshot

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Maximum number of devices drawn per host.
pub const MAX_DEVICES: usize = 8;

/// Maximum number of processes kept per snapshot.
pub const MAX_PROCESSES: usize = 5;

/// Accelerator family installed on a host; selects the device query path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// NVIDIA GPUs, queried with `nvidia-smi`.
    #[serde(rename = "GPU")]
    Gpu,
    /// XPUs, queried with `xpu-smi`.
    #[serde(rename = "XPU")]
    Xpu,
}

impl DeviceKind {
    /// Short label used in panels.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Gpu => "GPU",
            Self::Xpu => "XPU",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A monitored machine as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Hostname or address, also the host's identity in the dashboard.
    pub host: String,
    /// Login user.
    pub username: String,
    /// Accelerator family.
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    /// Private key passed to the transport, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<PathBuf>,
}

impl Host {
    /// Creates a host without a key path.
    #[must_use]
    pub fn new(host: impl Into<String>, username: impl Into<String>, kind: DeviceKind) -> Self {
        Self { host: host.into(), username: username.into(), kind, key: None }
    }

    /// `user@host` destination string.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

/// Host memory usage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemoryInfo {
    /// Used memory in whole gigabytes (rounded).
    pub used_gb: u64,
    /// Total memory in whole gigabytes (rounded).
    pub total_gb: u64,
    /// Used fraction of total, 0-100.
    pub percent: f64,
}

impl MemoryInfo {
    /// Value reported when the memory query yields nothing usable.
    #[must_use]
    pub const fn zero() -> Self {
        Self { used_gb: 0, total_gb: 0, percent: 0.0 }
    }
}

/// One accelerator device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceMetric {
    /// Device index as reported by the vendor tool.
    pub id: u32,
    /// Device family.
    pub kind: DeviceKind,
    /// Used device memory in MiB.
    pub used_mem_mb: u64,
    /// Total device memory in MiB.
    pub total_mem_mb: u64,
    /// Utilization percentage, 0-100.
    pub util_percent: u32,
    /// Temperature in Celsius.
    pub temp_c: i32,
    /// Power draw in watts.
    pub power_w: f64,
}

/// One row of the remote process table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessInfo {
    /// Process id.
    pub pid: u32,
    /// Owning user.
    pub user: String,
    /// CPU usage percentage.
    pub cpu_percent: f64,
    /// Memory usage percentage.
    pub mem_percent: f64,
    /// Command name.
    pub command: String,
}

/// Metrics for one host from one collection cycle.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Total CPU utilization percentage (0-100+, summed across non-idle categories).
    pub cpu_percent: f64,
    /// Memory usage.
    pub memory: MemoryInfo,
    /// Devices ordered by id ascending.
    pub devices: Vec<DeviceMetric>,
    /// Top processes by CPU, at most [`MAX_PROCESSES`].
    pub processes: Vec<ProcessInfo>,
    /// When collection finished.
    pub timestamp: DateTime<Local>,
}

impl Snapshot {
    /// Compares every field except the timestamp.
    #[must_use]
    pub fn same_metrics(&self, other: &Self) -> bool {
        self.cpu_percent.to_bits() == other.cpu_percent.to_bits()
            && self.memory == other.memory
            && self.devices == other.devices
            && self.processes == other.processes
    }

    /// Devices that fit in a panel.
    #[must_use]
    pub fn visible_devices(&self) -> &[DeviceMetric] {
        &self.devices[..self.devices.len().min(MAX_DEVICES)]
    }
}
