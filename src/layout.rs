//! Grid layout for host panels.
//!
//! Recomputed from scratch on every repaint, so a resize never leaves
//! placements from the previous terminal size behind.

use crate::types::{Snapshot, MAX_DEVICES};
use ratatui::layout::Rect;

/// Horizontal gap between columns and before the first one; also the gap between rows.
pub const MARGIN: u16 = 2;

/// Extra room added to the longest host name when sizing columns.
pub const HOST_PADDING: u16 = 6;

/// Columns are never narrower than this.
pub const BASELINE_COLUMN_WIDTH: u16 = 60;

/// Rows reserved at the top for the title bar.
pub const TITLE_ROWS: u16 = 1;

/// Rows kept free at the bottom for the status bar.
pub const BOTTOM_RESERVE: u16 = 2;

/// Height of a panel for a host without data.
pub const EMPTY_PANEL_HEIGHT: u16 = 3;

/// Rows a panel needs for `snapshot`.
///
/// Border, summary and bottom border take three rows, plus one per visible
/// device and one for the process line when there are processes.
#[must_use]
pub fn panel_height(snapshot: Option<&Snapshot>) -> u16 {
    let Some(snapshot) = snapshot else {
        return EMPTY_PANEL_HEIGHT;
    };
    let devices = snapshot.devices.len().min(MAX_DEVICES) as u16;
    let processes = u16::from(!snapshot.processes.is_empty());
    EMPTY_PANEL_HEIGHT + devices + processes
}

/// A panel to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRequest {
    /// Host shown in the panel.
    pub host: String,
    /// Rows the panel needs.
    pub height: u16,
}

impl PanelRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(host: impl Into<String>, height: u16) -> Self {
        Self { host: host.into(), height }
    }
}

/// A placed panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Host shown in the panel.
    pub host: String,
    /// Where to draw it.
    pub area: Rect,
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    /// Number of columns.
    pub columns: u16,
    /// Width of every column.
    pub column_width: u16,
    /// Panels that fit, in drawing order.
    pub placements: Vec<Placement>,
    /// Panels that did not fit vertically.
    pub omitted: usize,
}

/// Places host panels into a grid that fills the terminal width.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    /// Creates a layout engine.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Minimum column width for the given host names.
    #[must_use]
    pub fn min_column_width<'a>(hosts: impl IntoIterator<Item = &'a str>) -> u16 {
        let longest = hosts.into_iter().map(|h| h.chars().count()).max().unwrap_or(0);
        let wanted = u16::try_from(longest).unwrap_or(u16::MAX).saturating_add(HOST_PADDING);
        wanted.max(BASELINE_COLUMN_WIDTH)
    }

    /// Lays out `panels` in a `width` x `height` terminal.
    ///
    /// Panels are sorted by host and filled left to right, top to bottom. A
    /// row is as tall as its tallest panel. Once a panel would reach into the
    /// bottom reserve, it and every later panel are omitted.
    #[must_use]
    pub fn compute(&self, width: u16, height: u16, panels: &[PanelRequest]) -> GridLayout {
        let min_width = Self::min_column_width(panels.iter().map(|p| p.host.as_str()));
        let columns = (width.saturating_sub(MARGIN) / min_width.saturating_add(MARGIN)).max(1);
        let column_width = (width.saturating_sub(MARGIN * (columns + 1)) / columns).max(1);

        let mut sorted: Vec<&PanelRequest> = panels.iter().collect();
        sorted.sort_by(|a, b| a.host.cmp(&b.host));

        let limit = height.saturating_sub(BOTTOM_RESERVE);
        let mut placements = Vec::with_capacity(sorted.len());
        let mut row_top = TITLE_ROWS;

        'rows: for row in sorted.chunks(usize::from(columns)) {
            let mut row_height = 0;
            for (index, panel) in row.iter().enumerate() {
                if u32::from(row_top) + u32::from(panel.height) > u32::from(limit) {
                    break 'rows;
                }
                let x = MARGIN + index as u16 * (column_width + MARGIN);
                placements.push(Placement {
                    host: panel.host.clone(),
                    area: Rect::new(x, row_top, column_width, panel.height),
                });
                row_height = row_height.max(panel.height);
            }
            row_top = row_top.saturating_add(row_height).saturating_add(MARGIN);
        }

        let omitted = sorted.len() - placements.len();
        GridLayout { columns, column_width, placements, omitted }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn requests() -> impl Strategy<Value = Vec<PanelRequest>> {
        prop::collection::vec(("[a-z0-9.]{1,20}", 3u16..13), 0..24).prop_map(|items| {
            items.into_iter().map(|(host, height)| PanelRequest::new(host, height)).collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn prop_layout_is_deterministic(w in 0u16..400, h in 0u16..120, panels in requests()) {
            let engine = LayoutEngine::new();
            prop_assert_eq!(engine.compute(w, h, &panels), engine.compute(w, h, &panels));
        }

        #[test]
        fn prop_placements_stay_inside_usable_area(
            w in 70u16..400,
            h in 0u16..120,
            panels in requests(),
        ) {
            let layout = LayoutEngine::new().compute(w, h, &panels);

            prop_assert!(layout.columns >= 1);
            prop_assert_eq!(layout.placements.len() + layout.omitted, panels.len());
            for placement in &layout.placements {
                prop_assert!(placement.area.right() <= w);
                prop_assert!(placement.area.bottom() <= h.saturating_sub(BOTTOM_RESERVE));
                prop_assert!(placement.area.y >= TITLE_ROWS);
            }
        }
    }
}
