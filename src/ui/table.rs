use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::to_color32;
use crate::format::format_magnitude;
use crate::state::AppState;

/// Ranked country list for the selected year.
pub fn country_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Countries");
    ui.separator();

    let (Some(dataset), Some(encoding)) = (&state.dataset, &state.encoding) else {
        ui.label("No dataset loaded.");
        return;
    };
    let ranked = encoding.ranked();
    let hovered = state.hovered_info().map(|info| info.code);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto())
        .column(Column::remainder().at_least(100.0))
        .column(Column::auto())
        .column(Column::auto())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("GDP");
            });
            header.col(|ui| {
                ui.strong("Height");
            });
        })
        .body(|body| {
            body.rows(18.0, ranked.len(), |mut row| {
                let index = row.index();
                let (code, e) = ranked[index];
                row.set_selected(hovered.as_deref() == Some(code));
                let name = dataset.country(code).map_or(code, |r| r.name.as_str());

                row.col(|ui| {
                    ui.label((index + 1).to_string());
                });
                row.col(|ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, to_color32(e.color));
                        ui.label(name);
                    });
                });
                row.col(|ui| {
                    ui.label(format_magnitude(e.value));
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", e.height));
                });
            });
        });
}
