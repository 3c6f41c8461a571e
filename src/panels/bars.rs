//! Title bar and status bar.

use crate::widgets::put;
use chrono::{DateTime, Local};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

/// Text of the title bar.
pub const TITLE: &str = " Cluster Monitor (Press Q to exit) ";

/// Centred title on the first row of its area.
#[derive(Debug, Clone, Default)]
pub struct TitleBar {
    style: Style,
}

impl TitleBar {
    /// Creates a title bar drawn with `style`.
    #[must_use]
    pub fn new(style: Style) -> Self {
        Self { style }
    }
}

impl Widget for TitleBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let len = TITLE.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(len) / 2;
        put(buf, x, area.y, TITLE, self.style);
    }
}

/// Drawn/total host counts and the repaint clock on one row.
#[derive(Debug, Clone)]
pub struct StatusBar {
    drawn: usize,
    total: usize,
    now: DateTime<Local>,
    style: Style,
}

impl StatusBar {
    /// Creates a status bar.
    #[must_use]
    pub fn new(drawn: usize, total: usize, now: DateTime<Local>) -> Self {
        Self { drawn, total, now, style: Style::default() }
    }

    /// Sets the style.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Status text, e.g. ` Machines: 3/4 | Update: 14:02:11 `.
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            " Machines: {}/{} | Update: {} ",
            self.drawn,
            self.total,
            self.now.format("%H:%M:%S")
        )
    }
}

impl Widget for StatusBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 {
            return;
        }
        // The last column stays empty so the cursor never wraps.
        let text: String = self.text().chars().take(usize::from(area.width - 1)).collect();
        put(buf, area.x, area.y, &text, self.style);
    }
}
