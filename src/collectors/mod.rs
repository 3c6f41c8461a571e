//! Metric collection over a remote session.
//!
//! A [`MetricCollector`] runs four independent remote queries (CPU, memory,
//! devices, processes) through a [`CommandRunner`] and assembles them into one
//! [`Snapshot`]. Each query has its own parser with a named fallback, so a
//! malformed answer or a failing command costs one metric, not the snapshot.
//! Only a session-level failure (timeout, broken channel, failed reconnect)
//! aborts the cycle.

pub mod cpu;
pub mod devices;
pub mod memory;
pub mod process;

pub use cpu::{parse_cpu, CPU_COMMAND, CPU_FALLBACK};
pub use devices::{
    device_command, parse_devices, parse_gpu, parse_gpu_line, parse_xpu, parse_xpu_line,
    GPU_COMMAND, XPU_COMMAND,
};
pub use memory::{parse_memory, MEMORY_COMMAND};
pub use process::{parse_processes, PROCESS_COMMAND};

use crate::error::{CollectError, SessionError};
use crate::session::CommandRunner;
use crate::types::{DeviceKind, Host, Snapshot};
use chrono::Local;
use tracing::debug;

/// Collects snapshots for one host.
#[derive(Debug, Clone)]
pub struct MetricCollector {
    host: String,
    kind: DeviceKind,
}

impl MetricCollector {
    /// Creates a collector for `host`; its device kind selects the device query.
    #[must_use]
    pub fn new(host: &Host) -> Self {
        Self { host: host.host.clone(), kind: host.kind }
    }

    /// Runs one collection cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::SessionFailure`] if any query fails at the session
    /// level. A query that merely exits non-zero is treated as empty output.
    pub fn collect<R: CommandRunner + ?Sized>(
        &self,
        runner: &mut R,
    ) -> Result<Snapshot, CollectError> {
        let cpu_percent = parse_cpu(&self.query(runner, CPU_COMMAND)?);
        let memory = parse_memory(&self.query(runner, MEMORY_COMMAND)?);
        let devices = parse_devices(self.kind, &self.query(runner, device_command(self.kind))?);
        let processes = parse_processes(&self.query(runner, PROCESS_COMMAND)?);

        Ok(Snapshot { cpu_percent, memory, devices, processes, timestamp: Local::now() })
    }

    fn query<R: CommandRunner + ?Sized>(
        &self,
        runner: &mut R,
        command: &str,
    ) -> Result<Vec<String>, CollectError> {
        match runner.execute(command) {
            Ok(output) => Ok(output.lines),
            Err(SessionError::CommandFailed { exit_code, .. }) => {
                debug!(host = %self.host, command, exit_code, "query failed, using fallback");
                Ok(Vec::new())
            }
            Err(err) => Err(CollectError::SessionFailure(err)),
        }
    }
}
