use std::time::Duration;

use eframe::egui;

use crate::config::DataPaths;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GdpAtlasApp {
    pub state: AppState,
}

impl GdpAtlasApp {
    /// Start loading `paths` in the background; the UI stays responsive meanwhile.
    pub fn new(paths: DataPaths) -> Self {
        let mut state = AppState::default();
        state.begin_load(paths);
        Self { state }
    }
}

impl eframe::App for GdpAtlasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll_load() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls, legend, country info ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: ranked countries ----
        egui::SidePanel::right("country_table")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::country_table(ui, &self.state);
            });

        // ---- Central panel: bar preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let hovered = plot::country_bars(ui, &self.state);
            if self.state.is_interactive() {
                self.state.set_hovered(hovered.as_deref());
            }
        });

        panels::load_failure_notice(ctx, &self.state);
    }
}
