//! Scripted [`CommandRunner`] for unit tests.

use crate::error::{ConnectError, SessionError};
use crate::session::{CommandOutput, CommandRunner};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Answers commands from a table instead of a shell.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    responses: HashMap<String, String>,
    exits: HashMap<String, i32>,
    broken_calls: HashSet<usize>,
    refuse_connect: bool,
    pub(crate) connects: usize,
    pub(crate) calls: Vec<String>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `command` prints `output` and exits 0.
    pub(crate) fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    /// `command` exits with `code`.
    pub(crate) fn exit(mut self, command: &str, code: i32) -> Self {
        self.exits.insert(command.to_string(), code);
        self
    }

    /// The execute calls with these zero-based indices time out.
    pub(crate) fn break_calls(mut self, calls: impl IntoIterator<Item = usize>) -> Self {
        self.broken_calls.extend(calls);
        self
    }

    /// Every connect attempt fails.
    pub(crate) fn refuse_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }
}

impl CommandRunner for ScriptedRunner {
    fn connect(&mut self) -> Result<(), ConnectError> {
        self.connects += 1;
        if self.refuse_connect {
            return Err(ConnectError::Closed);
        }
        Ok(())
    }

    fn execute(&mut self, command: &str) -> Result<CommandOutput, SessionError> {
        let index = self.calls.len();
        self.calls.push(command.to_string());

        if self.refuse_connect {
            return Err(SessionError::Connect(ConnectError::Closed));
        }
        if self.broken_calls.contains(&index) {
            return Err(SessionError::Timeout(Duration::from_secs(10)));
        }
        if let Some(&exit_code) = self.exits.get(command) {
            return Err(SessionError::CommandFailed { command: command.to_string(), exit_code });
        }

        let lines = self
            .responses
            .get(command)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default();
        Ok(CommandOutput { lines, exit_code: 0 })
    }
}
