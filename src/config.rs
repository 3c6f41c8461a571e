//! Configuration for the fleet monitor.
//!
//! Reads the machine list from YAML:
//!
//! ```yaml
//! refresh_interval: 2
//! machines:
//!   - host: 10.0.0.11
//!     username: ops
//!     type: GPU
//!   - host: 10.0.0.12
//!     username: ops
//!     type: XPU
//!     key: ~/.ssh/id_ed25519
//! ```

use crate::error::{MonitorError, Result};
use crate::types::Host;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeouts for the remote shell sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long to wait for the ready sentinel after opening a channel.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// How long to wait for a command's completion sentinel.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Value passed to ssh's `ConnectTimeout` option.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_ready_timeout_ms() -> u64 {
    3000
}
fn default_command_timeout_ms() -> u64 {
    10_000
}
fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: default_ready_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl SessionConfig {
    /// Ready-sentinel wait as a Duration.
    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Command wait as a Duration.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Poll and forced-repaint interval in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    /// Hosts to monitor, in configuration order.
    #[serde(default)]
    pub machines: Vec<Host>,

    /// Session timeouts.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where to write log output; logging is off when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_refresh_interval() -> u64 {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            machines: Vec::new(),
            session: SessionConfig::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Loads, validates and normalizes configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| MonitorError::ConfigNotFound(path.display().to_string()))?;

        let mut config = Self::parse(&content)?;
        config.validate()?;
        config.expand_key_paths();
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            MonitorError::ConfigParse { line, message: e.to_string() }
        })
    }

    /// Checks the invariants the pollers rely on.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval < 1 {
            return Err(invalid("refresh_interval", "must be at least 1 second"));
        }
        if self.machines.is_empty() {
            return Err(invalid("machines", "at least one machine is required"));
        }

        let mut seen = HashSet::new();
        for machine in &self.machines {
            if machine.host.trim().is_empty() {
                return Err(invalid("machines.host", "must not be empty"));
            }
            if machine.username.trim().is_empty() {
                return Err(invalid(
                    "machines.username",
                    &format!("must not be empty (host {})", machine.host),
                ));
            }
            if !seen.insert(machine.host.as_str()) {
                return Err(invalid("machines.host", &format!("duplicate host {}", machine.host)));
            }
        }

        if self.session.command_timeout_ms == 0 || self.session.ready_timeout_ms == 0 {
            return Err(invalid("session", "timeouts must be positive"));
        }

        Ok(())
    }

    /// Returns the refresh interval as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    /// Expands a leading `~/` in key paths against the home directory.
    pub fn expand_key_paths(&mut self) {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        for machine in &mut self.machines {
            if let Some(key) = machine.key.as_mut() {
                if let Ok(rest) = key.strip_prefix("~") {
                    *key = home.join(rest);
                }
            }
        }
    }
}

fn invalid(key: &str, message: &str) -> MonitorError {
    MonitorError::ConfigInvalid { key: key.to_string(), message: message.to_string() }
}
