//! Colors for the dashboard.
//!
//! Uses the terminal's named ANSI colors so the dashboard follows the user's
//! terminal scheme.

use crate::state::HostStatus;
use ratatui::style::{Color, Modifier, Style};

/// Named colors for each dashboard element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Borders, title and status bar.
    pub chrome: Color,
    /// Device memory bars.
    pub memory: Color,
    /// Device utilization bars.
    pub utilization: Color,
    /// Hosts that never connected.
    pub unreachable: Color,
    /// Hosts showing their last good snapshot.
    pub stale: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            chrome: Color::Cyan,
            memory: Color::Blue,
            utilization: Color::Magenta,
            unreachable: Color::Red,
            stale: Color::Yellow,
        }
    }
}

impl Palette {
    /// Style for borders and bars around the grid.
    #[must_use]
    pub fn chrome(&self) -> Style {
        Style::default().fg(self.chrome)
    }

    /// Style for the title bar.
    #[must_use]
    pub fn title(&self) -> Style {
        self.chrome().add_modifier(Modifier::BOLD)
    }

    /// Border style for a host in the given state.
    #[must_use]
    pub fn border(&self, status: &HostStatus) -> Style {
        match status {
            HostStatus::Unreachable(_) => Style::default().fg(self.unreachable),
            HostStatus::Stale(_) => Style::default().fg(self.stale),
            HostStatus::Pending | HostStatus::Live => self.chrome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_default() {
        let palette = Palette::default();
        assert_eq!(palette.chrome, Color::Cyan);
        assert_eq!(palette.memory, Color::Blue);
        assert_eq!(palette.utilization, Color::Magenta);
    }

    #[test]
    fn test_border_follows_status() {
        let palette = Palette::default();

        assert_eq!(palette.border(&HostStatus::Live).fg, Some(Color::Cyan));
        assert_eq!(palette.border(&HostStatus::Stale("x".into())).fg, Some(Color::Yellow));
        assert_eq!(palette.border(&HostStatus::Unreachable("x".into())).fg, Some(Color::Red));
    }
}
