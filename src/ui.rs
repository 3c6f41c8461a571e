//! Frame rendering for the dashboard.

use crate::layout::{panel_height, GridLayout, LayoutEngine, PanelRequest};
use crate::panels::{HostPanel, StatusBar, TitleBar};
use crate::state::AggregateStore;
use crate::theme::Palette;
use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::Frame;

/// Draws one frame: title, host grid and status bar.
///
/// Returns the layout used so callers can report what was omitted.
pub fn draw(
    f: &mut Frame,
    store: &AggregateStore,
    palette: &Palette,
    now: DateTime<Local>,
) -> GridLayout {
    let area = f.area();

    let requests: Vec<PanelRequest> = store
        .iter()
        .map(|(host, entry)| PanelRequest::new(host, panel_height(entry.displayed())))
        .collect();
    let layout = LayoutEngine::new().compute(area.width, area.height, &requests);

    if area.height > 0 {
        f.render_widget(TitleBar::new(palette.title()), Rect::new(area.x, area.y, area.width, 1));
    }

    for placement in &layout.placements {
        if let Some(entry) = store.get(&placement.host) {
            f.render_widget(
                HostPanel::new(&placement.host, entry).palette(*palette),
                placement.area,
            );
        }
    }

    if area.height > 1 {
        let status =
            StatusBar::new(layout.placements.len(), store.len(), now).style(palette.chrome());
        f.render_widget(status, Rect::new(area.x, area.bottom() - 1, area.width, 1));
    }

    layout
}
