//! Panel for one host.
//!
//! ```text
//! ╭─ 10.0.0.11 ──────────────────────────────────────────────────╮
//! │ CPU: 12.5% MEM:  3/ 16G                                      │
//! │ GPU0      M[███        ] 1G/8G   U[████    ] 50%             │
//! │ python:88.0% sshd:0.3%                                       │
//! ╰──────────────────────────────────────────────────────────────╯
//! ```

use crate::state::{HostEntry, HostStatus};
use crate::theme::Palette;
use crate::types::{DeviceMetric, ProcessInfo, Snapshot};
use crate::widgets::{fit, put, DualBar};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

/// Columns taken by the device label in front of the bars.
const DEVICE_LABEL_WIDTH: u16 = 12;

/// Processes listed on the process line.
const SHOWN_PROCESSES: usize = 3;

/// Characters of the command name shown per process.
const COMMAND_CHARS: usize = 6;

/// Draws one host.
#[derive(Debug, Clone)]
pub struct HostPanel<'a> {
    host: &'a str,
    entry: &'a HostEntry,
    palette: Palette,
}

impl<'a> HostPanel<'a> {
    /// Creates a panel for `host`.
    #[must_use]
    pub fn new(host: &'a str, entry: &'a HostEntry) -> Self {
        Self { host, entry, palette: Palette::default() }
    }

    /// Sets the palette.
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    fn title(&self, width: usize) -> String {
        let marker = match self.entry.status() {
            HostStatus::Stale(_) if self.entry.is_stale() => " stale ─",
            HostStatus::Unreachable(_) => " unreachable ─",
            _ => "",
        };
        let head = format!("╭─ {} ─{marker}", self.host);
        format!("{}╮", fit(&head, width.saturating_sub(1), '─'))
    }

    fn no_data_line(&self) -> String {
        match self.entry.status() {
            HostStatus::Pending => " connecting...".to_string(),
            HostStatus::Unreachable(reason) | HostStatus::Stale(reason) => {
                format!(" no data: {reason}")
            }
            HostStatus::Live => " no data".to_string(),
        }
    }
}

/// Summary line: `CPU: 12.5% MEM:  3/ 16G`.
#[must_use]
pub fn summary_line(snapshot: &Snapshot) -> String {
    format!(
        " CPU:{:5.1}% MEM:{:3}/{:3}G",
        snapshot.cpu_percent, snapshot.memory.used_gb, snapshot.memory.total_gb
    )
}

/// Device label: `GPU0`.
#[must_use]
pub fn device_label(device: &DeviceMetric) -> String {
    format!("{}{}", device.kind.label(), device.id)
}

/// Top processes as `name:cpu%`, command names cut to six characters.
#[must_use]
pub fn process_line(processes: &[ProcessInfo]) -> String {
    processes
        .iter()
        .take(SHOWN_PROCESSES)
        .map(|p| {
            let name: String = p.command.chars().take(COMMAND_CHARS).collect();
            format!("{name}:{:.1}%", p.cpu_percent)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Widget for HostPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 2 || area.height == 0 {
            return;
        }

        let width = usize::from(area.width);
        let inner = width - 2;
        let border = self.palette.border(self.entry.status());
        let right = area.right() - 1;
        let mut y = area.y;

        put(buf, area.x, y, &self.title(width), border);
        y += 1;

        let body = |buf: &mut Buffer, y: u16, text: &str| {
            put(buf, area.x, y, &format!("│{}│", fit(text, inner, ' ')), border);
        };

        match self.entry.displayed() {
            None => {
                body(buf, y, &self.no_data_line());
                y += 1;
            }
            Some(snapshot) => {
                body(buf, y, &summary_line(snapshot));
                y += 1;

                for device in snapshot.visible_devices() {
                    let label = format!("│ {}", device_label(device));
                    put(buf, area.x, y, &fit(&label, usize::from(DEVICE_LABEL_WIDTH), ' '), border);
                    let bars = Rect::new(
                        area.x + DEVICE_LABEL_WIDTH,
                        y,
                        area.width.saturating_sub(DEVICE_LABEL_WIDTH + 2),
                        1,
                    );
                    DualBar::for_device(device)
                        .memory_color(self.palette.memory)
                        .util_color(self.palette.utilization)
                        .render(bars, buf);
                    put(buf, right, y, "│", border);
                    y += 1;
                }

                if !snapshot.processes.is_empty() {
                    body(buf, y, &format!(" {}", process_line(&snapshot.processes)));
                    y += 1;
                }
            }
        }

        let bottom = format!("╰{}╯", "─".repeat(inner));
        put(buf, area.x, y, &bottom, border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::{HostEvent, PollOutcome};
    use crate::state::AggregateStore;
    use crate::types::{DeviceKind, MemoryInfo};
    use chrono::Local;
    use ratatui::style::Color;

    fn snapshot() -> Snapshot {
        Snapshot {
            cpu_percent: 12.5,
            memory: MemoryInfo { used_gb: 3, total_gb: 16, percent: 18.75 },
            devices: vec![DeviceMetric {
                id: 0,
                kind: DeviceKind::Gpu,
                used_mem_mb: 1024,
                total_mem_mb: 8192,
                util_percent: 50,
                temp_c: 60,
                power_w: 120.5,
            }],
            processes: vec![
                ProcessInfo {
                    pid: 10,
                    user: "ml".into(),
                    cpu_percent: 88.0,
                    mem_percent: 4.0,
                    command: "python3".into(),
                },
                ProcessInfo {
                    pid: 11,
                    user: "root".into(),
                    cpu_percent: 0.3,
                    mem_percent: 0.1,
                    command: "sshd".into(),
                },
            ],
            timestamp: Local::now(),
        }
    }

    fn store_with(outcomes: Vec<PollOutcome>) -> AggregateStore {
        let mut store = AggregateStore::new(["node"]);
        for (i, outcome) in outcomes.into_iter().enumerate() {
            store.absorb(HostEvent { host: "node".into(), cycle: i as u64 + 1, outcome });
        }
        store
    }

    fn render(store: &AggregateStore, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        HostPanel::new("node", store.get("node").unwrap()).render(area, &mut buf);
        buf
    }

    fn line(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn test_live_panel_rows() {
        let store = store_with(vec![PollOutcome::Snapshot(snapshot())]);
        let buf = render(&store, 64, 5);

        assert!(line(&buf, 0).starts_with("╭─ node ───"));
        assert!(line(&buf, 0).ends_with('╮'));
        assert!(line(&buf, 1).starts_with("│ CPU: 12.5% MEM:  3/ 16G"), "{}", line(&buf, 1));
        assert!(line(&buf, 2).starts_with("│ GPU0      M[██"), "{}", line(&buf, 2));
        assert!(line(&buf, 2).contains("1G/8G"));
        assert!(line(&buf, 2).ends_with('│'));
        assert!(line(&buf, 3).starts_with("│ python:88.0% sshd:0.3%"), "{}", line(&buf, 3));
        assert!(line(&buf, 4).starts_with('╰'));
        assert!(line(&buf, 4).ends_with('╯'));
    }

    #[test]
    fn test_bar_colors() {
        let store = store_with(vec![PollOutcome::Snapshot(snapshot())]);
        let buf = render(&store, 64, 5);

        assert_eq!(buf[(12, 2)].fg, Color::Blue);
        assert_eq!(buf[(0, 0)].fg, Color::Cyan);
    }

    #[test]
    fn test_failed_host_keeps_last_snapshot_marked_stale() {
        let store = store_with(vec![
            PollOutcome::Snapshot(snapshot()),
            PollOutcome::Failed("command timed out".into()),
        ]);
        let buf = render(&store, 64, 5);

        assert!(line(&buf, 0).starts_with("╭─ node ─ stale ─"), "{}", line(&buf, 0));
        assert!(line(&buf, 1).contains("CPU: 12.5%"));
        assert_eq!(buf[(0, 0)].fg, Color::Yellow);
    }

    #[test]
    fn test_unreachable_host_shows_no_data() {
        let store = store_with(vec![PollOutcome::Unreachable("connection refused".into())]);
        let buf = render(&store, 64, 3);

        assert!(line(&buf, 0).contains("unreachable"));
        assert!(line(&buf, 1).starts_with("│ no data: connection refused"));
        assert!(line(&buf, 2).starts_with('╰'));
        assert_eq!(buf[(0, 1)].fg, Color::Red);
    }

    #[test]
    fn test_pending_host() {
        let store = AggregateStore::new(["node"]);
        let buf = render(&store, 64, 3);
        assert!(line(&buf, 1).contains("connecting"));
    }

    #[test]
    fn test_clipped_to_small_buffer() {
        let store = store_with(vec![PollOutcome::Snapshot(snapshot())]);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 2));
        HostPanel::new("node", store.get("node").unwrap()).render(Rect::new(0, 0, 64, 5), &mut buf);

        assert!(line(&buf, 0).starts_with("╭─ node"));
    }

    #[test]
    fn test_process_line_takes_top_three() {
        let mut processes = snapshot().processes;
        processes.extend(snapshot().processes);
        assert_eq!(process_line(&processes), "python:88.0% sshd:0.3% python:88.0%");
    }
}
