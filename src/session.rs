//! Persistent remote shell sessions.
//!
//! A [`RemoteSession`] keeps one shell channel open to one host and turns it
//! into a synchronous `execute(command) -> (output, exit_code)` call using the
//! sentinel framing from [`crate::protocol`].
//!
//! The channel's stdout is drained by a background reader thread into an
//! `mpsc` channel, so every read can be bounded with `recv_timeout` even though
//! the underlying pipe read blocks.
//!
//! A session is single-writer: interleaving two commands on one channel would
//! corrupt sentinel matching, which is why every operation takes `&mut self`.

use crate::config::SessionConfig;
use crate::error::{ConnectError, SessionError};
use crate::protocol::{Framing, Line};
use crate::types::Host;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Something that can open a shell on the target machine.
pub trait Transport: Send + fmt::Debug {
    /// Builds the command whose stdin/stdout are the remote shell.
    fn command(&self) -> Command;

    /// Human-readable target, used in logs.
    fn describe(&self) -> String;
}

/// Shell over the system `ssh` client. Authentication is left to ssh.
#[derive(Debug, Clone)]
pub struct SshTransport {
    host: Host,
    connect_timeout_secs: u64,
}

impl SshTransport {
    /// Creates an ssh transport for `host`.
    #[must_use]
    pub fn new(host: Host, connect_timeout_secs: u64) -> Self {
        Self { host, connect_timeout_secs }
    }

    /// Arguments passed to `ssh`.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let destination = self.host.destination();
        match &self.host.key {
            Some(key) => vec!["-i".to_string(), key.display().to_string(), destination],
            None => vec![
                "-T".to_string(),
                "-o".to_string(),
                format!("ConnectTimeout={}", self.connect_timeout_secs),
                "-o".to_string(),
                "BatchMode=yes".to_string(),
                "-o".to_string(),
                "StrictHostKeyChecking=no".to_string(),
                destination,
            ],
        }
    }
}

impl Transport for SshTransport {
    fn command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.args(self.args());
        cmd
    }

    fn describe(&self) -> String {
        self.host.destination()
    }
}

/// Shell on the local machine.
#[derive(Debug, Clone)]
pub struct LocalShell {
    program: String,
}

impl LocalShell {
    /// Uses `sh`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("sh")
    }

    /// Uses the given shell binary.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LocalShell {
    fn command(&self) -> Command {
        Command::new(&self.program)
    }

    fn describe(&self) -> String {
        format!("local:{}", self.program)
    }
}

/// Timeouts applied by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    /// Bound on the ready-sentinel wait.
    pub ready: Duration,
    /// Bound on a command's completion-sentinel wait.
    pub command: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self { ready: Duration::from_secs(3), command: Duration::from_secs(10) }
    }
}

impl From<&SessionConfig> for SessionTimeouts {
    fn from(config: &SessionConfig) -> Self {
        Self { ready: config.ready_timeout(), command: config.command_timeout() }
    }
}

/// Lifecycle of a session's channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No channel is open.
    Disconnected,
    /// Channel opened, waiting for the ready sentinel.
    Connecting,
    /// Idle and able to serve a command.
    Ready,
    /// A command was written and its completion sentinel is outstanding.
    AwaitingSentinel,
    /// The last connect attempt failed for the given reason.
    Degraded(String),
}

/// Output of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Lines printed before the completion sentinel, in order.
    pub lines: Vec<String>,
    /// Exit status (always 0 for a returned output).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Output joined back into text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// The request/response seam the collector and poller are written against.
pub trait CommandRunner {
    /// Establishes the channel.
    fn connect(&mut self) -> Result<(), ConnectError>;

    /// Runs one command to completion.
    fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError>;
}

enum ReadError {
    Timeout,
    Closed,
}

/// An open transport process plus the reader draining its stdout.
struct Channel {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl Channel {
    fn open(transport: &dyn Transport) -> Result<Self, ConnectError> {
        let mut child = transport
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ConnectError::Spawn)?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(ConnectError::Closed);
        };

        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new().name("session-reader".to_string()).spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']).to_string();
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        if let Err(e) = reader {
            let _ = child.kill();
            return Err(ConnectError::Spawn(e));
        }

        Ok(Self { child, stdin, lines: rx })
    }

    fn send(&mut self, text: &str) -> io::Result<()> {
        self.stdin.write_all(text.as_bytes())?;
        self.stdin.flush()
    }

    fn read_line(&self, deadline: Instant) -> Result<String, ReadError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(line) => Ok(line),
            Err(RecvTimeoutError::Timeout) => Err(ReadError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(ReadError::Closed),
        }
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A persistent shell session to one host.
pub struct RemoteSession<T: Transport> {
    transport: T,
    timeouts: SessionTimeouts,
    channel: Option<Channel>,
    framing: Framing,
    state: SessionState,
    connects: u64,
    seq: u64,
}

impl<T: Transport> fmt::Debug for RemoteSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSession")
            .field("transport", &self.transport)
            .field("state", &self.state)
            .field("connects", &self.connects)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RemoteSession<T> {
    /// Creates a disconnected session; nothing is spawned until first use.
    #[must_use]
    pub fn new(transport: T, timeouts: SessionTimeouts) -> Self {
        Self {
            transport,
            timeouts,
            channel: None,
            framing: Framing::new(""),
            state: SessionState::Disconnected,
            connects: 0,
            seq: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of connect attempts made so far.
    #[must_use]
    pub fn connects(&self) -> u64 {
        self.connects
    }

    /// Opens a fresh channel, replacing any existing one, and waits for the ready sentinel.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectError`] if the transport cannot be started or the
    /// shell does not announce itself within the ready timeout.
    pub fn connect(&mut self) -> Result<(), ConnectError> {
        self.channel = None;
        self.connects += 1;
        self.seq = 0;
        self.state = SessionState::Connecting;
        self.framing = Framing::new(format!("{}_{}", std::process::id(), self.connects));

        debug!(remote = %self.transport.describe(), attempt = self.connects, "opening session");

        match self.handshake() {
            Ok(channel) => {
                self.channel = Some(channel);
                self.state = SessionState::Ready;
                debug!(remote = %self.transport.describe(), "session ready");
                Ok(())
            }
            Err(err) => {
                warn!(remote = %self.transport.describe(), error = %err, "connect failed");
                self.state = SessionState::Degraded(err.to_string());
                Err(err)
            }
        }
    }

    fn handshake(&self) -> Result<Channel, ConnectError> {
        let mut channel = Channel::open(&self.transport)?;
        // A transport that exits before reading the init script surfaces as EPIPE.
        channel.send(&self.framing.init_script()).map_err(|e| match e.kind() {
            io::ErrorKind::BrokenPipe => ConnectError::Closed,
            _ => ConnectError::Io(e),
        })?;

        let deadline = Instant::now() + self.timeouts.ready;
        loop {
            match channel.read_line(deadline) {
                Ok(line) if self.framing.is_ready(&line) => return Ok(channel),
                Ok(_) => {}
                Err(ReadError::Timeout) => {
                    return Err(ConnectError::HandshakeTimeout(self.timeouts.ready))
                }
                Err(ReadError::Closed) => return Err(ConnectError::Closed),
            }
        }
    }

    /// Closes the channel; the next command reconnects.
    pub fn disconnect(&mut self) {
        self.channel = None;
        self.state = SessionState::Disconnected;
    }

    /// Runs `command` with the configured command timeout.
    ///
    /// # Errors
    ///
    /// See [`RemoteSession::execute_with_timeout`].
    pub fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        self.execute_with_timeout(command, self.timeouts.command)
    }

    /// Runs `command`, connecting first if the session is not ready.
    ///
    /// A broken channel during the exchange triggers exactly one reconnect and
    /// retry; if the reconnect fails the original error is returned. A timeout
    /// leaves the session disconnected so the next call reconnects.
    ///
    /// # Errors
    ///
    /// - [`SessionError::CommandFailed`] for a non-zero exit status (output discarded)
    /// - [`SessionError::Timeout`] if no completion sentinel arrives in time
    /// - [`SessionError::Connect`], [`SessionError::Closed`], [`SessionError::Io`]
    ///   for transport failures
    pub fn execute_with_timeout(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, SessionError> {
        if self.state != SessionState::Ready {
            self.connect()?;
        }

        match self.round_trip(command, timeout) {
            Err(err) if err.is_channel_broken() => {
                debug!(remote = %self.transport.describe(), error = %err, "reconnecting");
                if self.connect().is_err() {
                    return Err(err);
                }
                self.round_trip(command, timeout)
            }
            other => other,
        }
    }

    fn round_trip(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, SessionError> {
        self.seq += 1;
        let seq = self.seq;
        let wrapped = self.framing.wrap(command, seq);

        let Some(channel) = self.channel.as_mut() else {
            self.state = SessionState::Disconnected;
            return Err(SessionError::Closed);
        };

        if let Err(e) = channel.send(&wrapped) {
            self.disconnect();
            return Err(SessionError::Io(e));
        }
        self.state = SessionState::AwaitingSentinel;

        let deadline = Instant::now() + timeout;
        let mut lines = Vec::new();
        loop {
            let read = match self.channel.as_ref() {
                Some(channel) => channel.read_line(deadline),
                None => Err(ReadError::Closed),
            };
            match read {
                Ok(line) => match self.framing.classify(&line, seq) {
                    Line::Output(text) => lines.push(text),
                    Line::Stale => {}
                    Line::Done { exit_code: 0, trailing } => {
                        lines.extend(trailing);
                        self.state = SessionState::Ready;
                        return Ok(CommandOutput { lines, exit_code: 0 });
                    }
                    Line::Done { exit_code, .. } => {
                        self.state = SessionState::Ready;
                        debug!(command, exit_code, "remote command failed");
                        return Err(SessionError::CommandFailed {
                            command: command.to_string(),
                            exit_code,
                        });
                    }
                },
                Err(ReadError::Timeout) => {
                    warn!(remote = %self.transport.describe(), command, "command timed out");
                    self.disconnect();
                    return Err(SessionError::Timeout(timeout));
                }
                Err(ReadError::Closed) => {
                    self.disconnect();
                    return Err(SessionError::Closed);
                }
            }
        }
    }
}

impl<T: Transport> CommandRunner for RemoteSession<T> {
    fn connect(&mut self) -> Result<(), ConnectError> {
        RemoteSession::connect(self)
    }

    fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        RemoteSession::execute(self, command)
    }
}
