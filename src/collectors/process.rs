//! Top processes by CPU.

use crate::types::{ProcessInfo, MAX_PROCESSES};

/// Header plus the busiest processes, sorted by CPU descending.
pub const PROCESS_COMMAND: &str = "ps -eo pid,user,pcpu,pmem,comm --sort=-pcpu | head -n 5";

/// Parses `pid user cpu% mem% command` rows, keeping the top [`MAX_PROCESSES`] by CPU.
///
/// The header row and malformed rows are dropped.
#[must_use]
pub fn parse_processes(lines: &[String]) -> Vec<ProcessInfo> {
    let mut processes: Vec<ProcessInfo> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with("PID"))
        .filter_map(parse_process_line)
        .collect();

    processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    processes.truncate(MAX_PROCESSES);
    processes
}

/// Parses one `ps` row; the command keeps any embedded whitespace.
#[must_use]
pub fn parse_process_line(line: &str) -> Option<ProcessInfo> {
    let fields = split_fields(line, 5);
    let [pid, user, cpu, mem, command] = fields.as_slice() else {
        return None;
    };

    Some(ProcessInfo {
        pid: pid.parse().ok()?,
        user: (*user).to_string(),
        cpu_percent: cpu.parse().ok().filter(|v: &f64| v.is_finite())?,
        mem_percent: mem.parse().ok().filter(|v: &f64| v.is_finite())?,
        command: (*command).to_string(),
    })
}

/// Splits on runs of whitespace into at most `max` fields; the last field keeps the remainder.
fn split_fields(line: &str, max: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(max);
    let mut rest = line.trim();
    while !rest.is_empty() {
        if fields.len() + 1 == max {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}
