//! Error types for the fleet monitor.
//!
//! Errors are layered the same way data flows: a [`ConnectError`] can only come
//! out of session establishment, a [`SessionError`] out of a single remote
//! command, a [`CollectError`] out of one collection cycle, and
//! [`MonitorError`] covers everything that can stop the process itself
//! (configuration and terminal handling).

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failure to establish a shell channel to a host.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The transport process could not be started.
    #[error("failed to spawn transport: {0}")]
    Spawn(#[source] io::Error),

    /// The transport exited before the shell announced itself.
    #[error("transport closed before the shell became ready")]
    Closed,

    /// The ready sentinel was not observed within the handshake window.
    #[error("shell did not become ready within {0:?}")]
    HandshakeTimeout(Duration),

    /// Writing the initialization commands failed.
    #[error("handshake I/O error: {0}")]
    Io(#[source] io::Error),
}

/// Failure of a single remote command.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session had to (re)connect and could not.
    #[error("connect failed: {0}")]
    Connect(#[from] ConnectError),

    /// No completion sentinel arrived before the command deadline.
    #[error("no completion sentinel within {0:?}")]
    Timeout(Duration),

    /// The remote command finished with a non-zero exit status.
    #[error("command `{command}` exited with code {exit_code}")]
    CommandFailed {
        /// The command as submitted by the caller.
        command: String,
        /// Exit status carried by the sentinel (-1 when unparseable).
        exit_code: i32,
    },

    /// The transport went away while a command was in flight.
    #[error("channel closed while waiting for output")]
    Closed,

    /// Writing the command to the channel failed.
    #[error("channel I/O error: {0}")]
    Io(#[source] io::Error),
}

impl SessionError {
    /// Returns true if the channel broke mid-exchange and a fresh one may succeed.
    #[must_use]
    pub fn is_channel_broken(&self) -> bool {
        matches!(self, Self::Closed | Self::Io(_))
    }
}

/// Failure of a whole collection cycle.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The session could not serve one of the metric commands.
    #[error("session failure: {0}")]
    SessionFailure(#[from] SessionError),
}

/// Error type for process-level operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 if unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// Terminal initialization or rendering error.
    #[error("terminal error: {0}")]
    TerminalError(#[from] io::Error),

    /// Log file could not be opened or a subscriber was already installed.
    #[error("logging error: {0}")]
    Logging(String),
}

/// Result type alias for process-level operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parse_error_includes_line_number() {
        let err = MonitorError::ConfigParse { line: 42, message: "invalid value".to_string() };
        let display = err.to_string();

        assert!(display.contains("42"), "Error should include line number: {display}");
        assert!(display.contains("invalid value"), "Error should include message: {display}");
    }

    #[test]
    fn test_config_invalid_includes_key() {
        let err = MonitorError::ConfigInvalid {
            key: "refresh_interval".to_string(),
            message: "must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("refresh_interval"));
    }

    #[test]
    fn test_command_failed_includes_command_and_code() {
        let err = SessionError::CommandFailed { command: "xpu-smi".to_string(), exit_code: 127 };
        let display = err.to_string();

        assert!(display.contains("xpu-smi"));
        assert!(display.contains("127"));
    }

    #[test]
    fn test_broken_channel_classification() {
        assert!(SessionError::Closed.is_channel_broken());
        assert!(SessionError::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_channel_broken());
        assert!(!SessionError::Timeout(Duration::from_secs(10)).is_channel_broken());
        assert!(!SessionError::Connect(ConnectError::Closed).is_channel_broken());
        let failed = SessionError::CommandFailed { command: "false".into(), exit_code: 1 };
        assert!(!failed.is_channel_broken());
    }

    #[test]
    fn test_collect_error_wraps_session_error() {
        let err: CollectError = SessionError::Timeout(Duration::from_secs(10)).into();
        assert!(err.to_string().contains("session failure"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no tty");
        let monitor_err: MonitorError = io_err.into();

        assert!(matches!(monitor_err, MonitorError::TerminalError(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MonitorError>();
        assert_send_sync::<SessionError>();
        assert_send_sync::<CollectError>();
    }
}
