//! Sentinel framing over a line-oriented shell channel.
//!
//! A shell channel has no message boundaries, so every exchange is framed by
//! marker lines the shell itself prints:
//!
//! ```text
//! ready       := "SHELL_READY_" token
//! completion  := "CMD_FINISHED_" seq "_" exit-code
//! ```
//!
//! `token` is unique per connection and `seq` is unique per command within a
//! connection, so a marker from an abandoned exchange is recognised as stale
//! instead of terminating the current one. Both markers are emitted from
//! split quoted halves (`"CMD_""FINISHED_..."`), so if the remote side echoes
//! our input the echoed text never matches a marker.
//!
//! The exchange itself runs `AwaitingReady -> Ready -> AwaitingSentinel -> Ready`;
//! the session drives those transitions, this module only builds and
//! classifies lines.

/// Prefix of the line announcing a ready shell.
pub const READY_PREFIX: &str = "SHELL_READY_";

/// Prefix of the line terminating a command.
pub const COMPLETION_PREFIX: &str = "CMD_FINISHED_";

/// Exit code reported when the completion suffix is not a number.
pub const UNPARSEABLE_EXIT: i32 = -1;

/// Classification of one line read while a command is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Ordinary command output.
    Output(String),
    /// Completion marker of the current command.
    Done {
        /// Exit status carried by the marker.
        exit_code: i32,
        /// Output printed without a final newline, which runs into the marker.
        trailing: Option<String>,
    },
    /// Completion marker of some other command; to be discarded.
    Stale,
}

/// Marker builder/parser for one connection.
#[derive(Debug, Clone)]
pub struct Framing {
    token: String,
}

impl Framing {
    /// Creates the framing for a connection identified by `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Commands sent right after the channel opens; the last one prints the ready marker.
    #[must_use]
    pub fn init_script(&self) -> String {
        format!(
            "export LANG=C\nexport LC_ALL=C\nstty -echo 2>/dev/null\necho \"{}\"\"{}{}\"\n",
            split_head(READY_PREFIX),
            split_tail(READY_PREFIX),
            self.token
        )
    }

    /// Returns true if `line` is this connection's ready marker.
    #[must_use]
    pub fn is_ready(&self, line: &str) -> bool {
        line.trim() == format!("{READY_PREFIX}{}", self.token)
    }

    /// Wraps a command so the shell reports its exit status after it.
    #[must_use]
    pub fn wrap(&self, command: &str, seq: u64) -> String {
        format!(
            "{command} ; echo \"{}\"\"{}{seq}_$?\"\n",
            split_head(COMPLETION_PREFIX),
            split_tail(COMPLETION_PREFIX)
        )
    }

    /// Classifies a line read while waiting for command `seq` to finish.
    #[must_use]
    pub fn classify(&self, line: &str, seq: u64) -> Line {
        let Some(pos) = line.find(COMPLETION_PREFIX) else {
            return Line::Output(line.to_string());
        };

        let (head, marker) = line.split_at(pos);
        let suffix = marker[COMPLETION_PREFIX.len()..].trim();
        let exit_code = match suffix.split_once('_') {
            Some((line_seq, code)) => match line_seq.parse::<u64>() {
                Ok(n) if n != seq => return Line::Stale,
                _ => parse_exit_code(code),
            },
            None => UNPARSEABLE_EXIT,
        };
        let trailing = (!head.is_empty()).then(|| head.to_string());
        Line::Done { exit_code, trailing }
    }
}

/// Parses the exit status carried by a completion marker.
#[must_use]
pub fn parse_exit_code(text: &str) -> i32 {
    text.trim().parse().unwrap_or(UNPARSEABLE_EXIT)
}

fn split_head(marker: &str) -> &str {
    &marker[..marker.len() / 2]
}

fn split_tail(marker: &str) -> &str {
    &marker[marker.len() / 2..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(exit_code: i32, trailing: Option<&str>) -> Line {
        Line::Done { exit_code, trailing: trailing.map(str::to_string) }
    }

    #[test]
    fn test_wrap_appends_split_marker() {
        let framing = Framing::new("t1");
        let wrapped = framing.wrap("free -b", 7);

        assert!(wrapped.starts_with("free -b ; echo "));
        assert!(wrapped.ends_with("7_$?\"\n"));
        assert!(!wrapped.contains(COMPLETION_PREFIX), "echoed input must not match: {wrapped}");
    }

    #[test]
    fn test_init_script_sets_c_locale_and_disables_echo() {
        let script = Framing::new("abc").init_script();

        assert!(script.contains("export LANG=C\n"));
        assert!(script.contains("export LC_ALL=C\n"));
        assert!(script.contains("stty -echo"));
        assert!(!script.contains("SHELL_READY_abc"));
    }

    #[test]
    fn test_is_ready_requires_own_token() {
        let framing = Framing::new("42_1");

        assert!(framing.is_ready("SHELL_READY_42_1"));
        assert!(framing.is_ready("  SHELL_READY_42_1\r"));
        assert!(!framing.is_ready("SHELL_READY_42_0"));
        assert!(!framing.is_ready("Welcome to Ubuntu"));
    }

    #[test]
    fn test_classify_output_and_done() {
        let framing = Framing::new("t");

        assert_eq!(framing.classify("0, 1024, 8192", 3), Line::Output("0, 1024, 8192".into()));
        assert_eq!(framing.classify("CMD_FINISHED_3_0", 3), done(0, None));
        assert_eq!(framing.classify("CMD_FINISHED_3_127\r", 3), done(127, None));
    }

    #[test]
    fn test_classify_stale_marker() {
        let framing = Framing::new("t");
        assert_eq!(framing.classify("CMD_FINISHED_2_0", 3), Line::Stale);
    }

    #[test]
    fn test_classify_unparseable_exit_is_failure() {
        let framing = Framing::new("t");

        assert_eq!(framing.classify("CMD_FINISHED_3_$?", 3), done(UNPARSEABLE_EXIT, None));
        assert_eq!(framing.classify("CMD_FINISHED_garbage", 3), done(UNPARSEABLE_EXIT, None));
    }

    #[test]
    fn test_marker_in_middle_of_line_keeps_prefix() {
        // Output without a trailing newline runs into the marker.
        let framing = Framing::new("t");

        assert_eq!(framing.classify("abcCMD_FINISHED_5_0", 5), done(0, Some("abc")));
        assert_eq!(framing.classify("partialCMD_FINISHED_5_1", 5), done(1, Some("partial")));
        assert_eq!(framing.classify("oldCMD_FINISHED_4_0", 5), Line::Stale);
    }

    #[test]
    fn test_parse_exit_code() {
        assert_eq!(parse_exit_code("0"), 0);
        assert_eq!(parse_exit_code(" 2 "), 2);
        assert_eq!(parse_exit_code("x"), UNPARSEABLE_EXIT);
    }
}
