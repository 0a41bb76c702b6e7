use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::to_color32;
use crate::config::{
    DataPaths, AMPLIFICATION_RANGE, AMPLIFICATION_STEP, HEIGHT_SCALE_RANGE, HEIGHT_SCALE_STEP,
    MIN_HEIGHT_RANGE, MIN_HEIGHT_STEP_PERCENT,
};
use crate::state::{AppState, ViewMode};

// ---------------------------------------------------------------------------
// Left side panel – controls, legend, country info
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("GDP by Country");
    ui.separator();

    if state.loading {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Loading GDP data…");
        });
        return;
    }
    let Some((first_year, last_year)) = state.year_bounds() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            controls(ui, state, first_year, last_year);
            ui.separator();
            legend(ui, state);
            ui.separator();
            country_info(ui, state);
        });
}

fn controls(ui: &mut Ui, state: &mut AppState, first_year: i32, last_year: i32) {
    ui.strong("Year");
    let mut year = state.year;
    if ui
        .add(egui::Slider::new(&mut year, first_year..=last_year))
        .changed()
    {
        state.set_year(year);
    }

    ui.strong("Height Scale");
    let mut height_scale = state.params.height_scale;
    if ui
        .add(
            egui::Slider::new(&mut height_scale, HEIGHT_SCALE_RANGE)
                .step_by(HEIGHT_SCALE_STEP)
                .suffix("x"),
        )
        .changed()
    {
        state.set_height_scale(height_scale);
    }

    ui.strong("Amplification");
    let mut amplification = state.params.amplification;
    if ui
        .add(
            egui::Slider::new(&mut amplification, AMPLIFICATION_RANGE)
                .step_by(AMPLIFICATION_STEP)
                .fixed_decimals(1)
                .suffix("x"),
        )
        .changed()
    {
        state.set_amplification(amplification);
    }

    ui.strong("Min Height");
    let mut percent = state.params.min_height_fraction * 100.0;
    let percent_range = MIN_HEIGHT_RANGE.start() * 100.0..=MIN_HEIGHT_RANGE.end() * 100.0;
    if ui
        .add(
            egui::Slider::new(&mut percent, percent_range)
                .step_by(MIN_HEIGHT_STEP_PERCENT)
                .fixed_decimals(1)
                .suffix("%"),
        )
        .changed()
    {
        state.set_min_height_fraction(percent / 100.0);
    }
}

fn legend(ui: &mut Ui, state: &AppState) {
    let Some(encoding) = &state.encoding else {
        return;
    };

    ui.strong("GDP Color Scale (Log)");
    if encoding.color_legend.is_empty() {
        ui.label(format!("No data for {}", encoding.year));
    }
    for entry in &encoding.color_legend {
        ui.horizontal(|ui: &mut Ui| {
            swatch(ui, to_color32(entry.color), egui::vec2(16.0, 12.0));
            ui.label(&entry.label);
        });
    }

    if state.view_mode == ViewMode::Flat {
        return;
    }

    ui.add_space(6.0);
    ui.strong(format!("Height Scale ({}x)", encoding.params.height_scale));
    for entry in &encoding.height_legend {
        ui.horizontal(|ui: &mut Ui| {
            let bar = (entry.fraction * 30.0).max(3.0) as f32;
            swatch(ui, Color32::from_rgb(0x21, 0x71, 0xb5), egui::vec2(8.0, bar));
            ui.label(&entry.label);
        });
    }
    ui.small(format!("Amplification: {:.1}x", encoding.params.amplification));
    ui.small(format!(
        "Min Height: {:.1}%",
        encoding.params.min_height_fraction * 100.0
    ));
}

fn country_info(ui: &mut Ui, state: &AppState) {
    ui.strong("Country");
    match state.hovered_info() {
        Some(info) => {
            ui.label(format!("Country: {}", info.name));
            ui.label(format!("GDP ({}): {}", info.year, info.formatted_value));
            ui.label(format!("Region: {}", info.region));
            ui.label(format!("Income Group: {}", info.income_group));
        }
        None => {
            ui.label("Hover over a country to see details");
        }
    }
}

fn swatch(ui: &mut Ui, color: Color32, size: egui::Vec2) {
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    ui.painter().rect_filled(rect, 2.0, color);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open value table…").clicked() {
                open_value_table_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.is_interactive(), egui::Button::new("Export map style…"))
                .clicked()
            {
                export_style_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{} countries, showing {}", ds.len(), state.year));
            let outlines = state.sink.feature_count();
            if outlines > 0 {
                ui.label(format!("{outlines} outlines"));
            }
            ui.separator();
        }

        let toggle_text = match state.view_mode {
            ViewMode::Extruded => "Switch to 2D View",
            ViewMode::Flat => "Switch to 3D View",
        };
        if ui
            .add_enabled(state.is_interactive(), egui::Button::new(toggle_text))
            .clicked()
        {
            state.toggle_view_mode();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Blocking notice for a failed load; nothing else is interactive behind it.
pub fn load_failure_notice(ctx: &egui::Context, state: &AppState) {
    if state.loading || state.dataset.is_some() {
        return;
    }
    let Some(msg) = &state.status_message else {
        return;
    };
    egui::Window::new("Failed to load GDP data")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(msg);
            ui.label("Check the data paths and restart, or open another value table from the File menu.");
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_value_table_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open World Bank value table")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let mut paths = DataPaths::for_value_table(&path);
        paths.boundaries = DataPaths::from_env().boundaries;
        state.begin_load(paths);
    }
}

pub fn export_style_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export map style")
        .set_file_name("gdp-map-style.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match state.sink.export(&path) {
            Ok(()) => {
                log::info!("Exported map style to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export map style: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
