//! Device memory and utilization shown as two bars on one row.
//!
//! ```text
//! M[███                     ] 1G/8G   U[████████        ] 50%
//! ```
//!
//! Of the area width, 20 columns go to brackets and labels. The memory bar
//! gets 60% of the rest and the utilization bar 40%.

use super::put;
use crate::types::DeviceMetric;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

/// Columns reserved for brackets and labels.
const LABEL_ROOM: u16 = 20;

/// Gap between the end of the memory label and the utilization bar.
const GAP: u16 = 3;

const FILL: char = '█';

/// Memory and utilization bars for one device.
#[derive(Debug, Clone)]
pub struct DualBar {
    used_mb: u64,
    total_mb: u64,
    util_percent: u32,
    memory_color: Color,
    util_color: Color,
}

impl DualBar {
    /// Creates bars for `used_mb` of `total_mb` memory at `util_percent` utilization.
    #[must_use]
    pub fn new(used_mb: u64, total_mb: u64, util_percent: u32) -> Self {
        Self {
            used_mb,
            total_mb,
            util_percent: util_percent.min(100),
            memory_color: Color::Blue,
            util_color: Color::Magenta,
        }
    }

    /// Creates bars for a device.
    #[must_use]
    pub fn for_device(device: &DeviceMetric) -> Self {
        Self::new(device.used_mem_mb, device.total_mem_mb, device.util_percent)
    }

    /// Sets the memory bar color.
    #[must_use]
    pub fn memory_color(mut self, color: Color) -> Self {
        self.memory_color = color;
        self
    }

    /// Sets the utilization bar color.
    #[must_use]
    pub fn util_color(mut self, color: Color) -> Self {
        self.util_color = color;
        self
    }

    /// Memory label in whole GiB, truncated: `used/total`.
    #[must_use]
    pub fn memory_label(&self) -> String {
        format!("{}G/{}G", self.used_mb / 1024, self.total_mb / 1024)
    }

    /// Used memory fraction in 0.0-1.0.
    #[must_use]
    pub fn memory_fraction(&self) -> f64 {
        if self.total_mb == 0 {
            return 0.0;
        }
        (self.used_mb as f64 / self.total_mb as f64).clamp(0.0, 1.0)
    }

    /// Bar widths `(memory, utilization)` for an area `width` columns wide.
    #[must_use]
    pub fn bar_widths(width: u16) -> (u16, u16) {
        let room = u32::from(width.saturating_sub(LABEL_ROOM));
        // Both fit in u16 since they are at most `room`.
        ((room * 3 / 5) as u16, (room * 2 / 5) as u16)
    }
}

/// Number of filled cells for `fraction` of `cells`, rounded down.
#[must_use]
pub fn filled(cells: u16, fraction: f64) -> u16 {
    ((f64::from(cells) * fraction.clamp(0.0, 1.0)) as u16).min(cells)
}

fn bar(cells: u16, fill: u16) -> String {
    let mut out: String = std::iter::repeat(FILL).take(usize::from(fill)).collect();
    out.extend(std::iter::repeat(' ').take(usize::from(cells - fill)));
    out
}

impl Widget for DualBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (mem_cells, util_cells) = Self::bar_widths(area.width);
        let mem_label = self.memory_label();

        let mem_fill = filled(mem_cells, self.memory_fraction());
        let memory = format!("M[{}] {mem_label}", bar(mem_cells, mem_fill));
        put(buf, area.x, area.y, &memory, Style::default().fg(self.memory_color));

        let util_x = area.x.saturating_add(mem_cells + mem_label.len() as u16 + 4 + GAP);
        let util_fill = filled(util_cells, f64::from(self.util_percent) / 100.0);
        let util = format!("U[{}] {}%", bar(util_cells, util_fill), self.util_percent);
        put(buf, util_x, area.y, &util, Style::default().fg(self.util_color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn rendered(bar: DualBar, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).unwrap();
        terminal.draw(|frame| frame.render_widget(bar, frame.area())).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol().to_string()).collect()
    }

    #[test]
    fn test_memory_label_truncates_to_whole_gib() {
        assert_eq!(DualBar::new(1024, 8192, 50).memory_label(), "1G/8G");
        assert_eq!(DualBar::new(2047, 81_559, 0).memory_label(), "1G/79G");
        assert_eq!(DualBar::new(0, 0, 0).memory_label(), "0G/0G");
    }

    #[test]
    fn test_bar_widths_split_sixty_forty() {
        assert_eq!(DualBar::bar_widths(60), (24, 16));
        assert_eq!(DualBar::bar_widths(50), (18, 12));
        assert_eq!(DualBar::bar_widths(10), (0, 0));
    }

    #[test]
    fn test_filled_rounds_down_and_clamps() {
        assert_eq!(filled(24, 0.125), 3);
        assert_eq!(filled(18, 0.125), 2);
        assert_eq!(filled(10, 1.5), 10);
        assert_eq!(filled(10, -1.0), 0);
    }

    #[test]
    fn test_device_row_rendering() {
        let line = rendered(DualBar::new(1024, 8192, 50), 60);

        let memory = format!("M[{}{}] 1G/8G", "█".repeat(3), " ".repeat(21));
        assert!(line.starts_with(&memory), "memory bar at 12.5%: {line}");

        // 24 bar cells + "M[] " + "1G/8G" + 3 gap = column 36.
        let util = format!("U[{}{}] 50%", "█".repeat(8), " ".repeat(8));
        assert_eq!(line.find("U[").map(|i| line[..i].chars().count()), Some(36));
        assert!(line.contains(&util), "utilization bar at 50%: {line}");
    }

    #[test]
    fn test_util_clamped_to_hundred() {
        let bar = DualBar::new(0, 0, 250);
        assert_eq!(bar.util_percent, 100);
        assert!(bar.memory_fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn test_narrow_area_does_not_panic() {
        let line = rendered(DualBar::new(4096, 8192, 75), 8);
        assert!(line.starts_with("M[] 4G/8"));
    }
}
