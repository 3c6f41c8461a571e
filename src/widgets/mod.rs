//! Low-level drawing helpers shared by the panels.
//!
//! Everything here writes through [`put`], which drops text whose start lies
//! outside the buffer and truncates text that runs past its right edge. No
//! drawing call can panic on a terminal that is smaller than the layout
//! expected.

pub mod dual_bar;

pub use dual_bar::DualBar;

use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::style::Style;

/// Writes `text` at `(x, y)`, clipped to the buffer.
pub fn put(buf: &mut Buffer, x: u16, y: u16, text: &str, style: Style) {
    let area = buf.area;
    if !area.contains(Position::new(x, y)) {
        return;
    }
    let room = usize::from(area.right() - x);
    buf.set_stringn(x, y, text, room, style);
}

/// Pads `text` with `pad`, or truncates it, to exactly `width` characters.
#[must_use]
pub fn fit(text: &str, width: usize, pad: char) -> String {
    let mut out: String = text.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(pad).take(width - len));
    out
}
