use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Plot};

use crate::color::to_color32;
use crate::state::{AppState, ViewMode};

// ---------------------------------------------------------------------------
// Country preview (central panel)
// ---------------------------------------------------------------------------

/// Render every country with data as a bar, tallest first, coloured and sized
/// by its encoding. Returns the code of the bar under the pointer.
pub fn country_bars(ui: &mut Ui, state: &AppState) -> Option<String> {
    let Some(encoding) = &state.encoding else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loading {
                ui.spinner();
            } else {
                ui.heading("Open a value table to view GDP  (File → Open value table…)");
            }
        });
        return None;
    };

    let ranked = encoding.ranked();
    if ranked.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(format!("No GDP data for {}", encoding.year));
        });
        return None;
    }

    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, (code, e))| {
            let value = match state.view_mode {
                ViewMode::Extruded => e.height,
                ViewMode::Flat => 1.0,
            };
            Bar::new(i as f64, value)
                .name(*code)
                .fill(to_color32(e.color))
                .width(0.8)
        })
        .collect();

    let y_label = match state.view_mode {
        ViewMode::Extruded => "Extrusion height",
        ViewMode::Flat => "",
    };

    let response = Plot::new("country_bars")
        .x_axis_label("Countries by GDP")
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(format!("GDP {}", encoding.year)));
            plot_ui.pointer_coordinate()
        });

    if !response.response.hovered() {
        return None;
    }
    let pointer = response.inner?;
    let index = pointer.x.round();
    if index < 0.0 || (pointer.x - index).abs() > 0.4 {
        return None;
    }
    ranked
        .get(index as usize)
        .map(|(code, _)| (*code).to_string())
}
