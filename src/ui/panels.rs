use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::color::{series_color, to_color32};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // ---- Chart type ----
    ui.strong("Chart type");
    let current = state.chart_kind;
    egui::ComboBox::from_id_salt("chart_kind")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for kind in ChartKind::ALL {
                if ui.selectable_label(current == kind, kind.label()).clicked() {
                    state.set_chart_kind(kind);
                }
            }
        });
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    year_controls(ui, state);
    ui.separator();
    country_controls(ui, state);
}

fn year_controls(ui: &mut Ui, state: &mut AppState) {
    let Some((lo, hi)) = state.filters.year_index_range(&state.dataset.domain) else {
        return;
    };
    let years = state.dataset.domain.years.clone();
    let last = years.len() - 1;

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Years");
        ui.label(format!("{} – {}", years[lo], years[hi]));
    });

    // ---- Numeric inputs, applied on demand ----
    ui.horizontal(|ui: &mut Ui| {
        ui.add(egui::DragValue::new(&mut state.year_min_input).speed(1.0));
        ui.label("to");
        ui.add(egui::DragValue::new(&mut state.year_max_input).speed(1.0));
        if ui.button("Apply").clicked() {
            state.apply_year_inputs();
        }
    });

    // ---- Index sliders (no gaps between existing years) ----
    let mut lo_idx = lo;
    if ui
        .add(egui::Slider::new(&mut lo_idx, 0..=last).show_value(false).text("From"))
        .changed()
    {
        state.set_min_year_index(lo_idx);
    }
    let mut hi_idx = hi;
    if ui
        .add(egui::Slider::new(&mut hi_idx, 0..=last).show_value(false).text("To"))
        .changed()
    {
        state.set_max_year_index(hi_idx);
    }
}

fn country_controls(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.filters.selected().len();
    let n_total = state.dataset.domain.countries.len();
    ui.strong(format!("Countries  ({n_selected}/{n_total})"));

    ui.add(egui::TextEdit::singleline(&mut state.country_query).hint_text("Search country…"));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.clear_all();
        }
    });

    // Owned copy so the checkboxes can mutate state.
    let visible: Vec<(usize, String)> = state
        .visible_countries()
        .into_iter()
        .map(|(i, c)| (i, c.to_string()))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (idx, country) in &visible {
                let mut checked = state.filters.is_selected(country);
                let text = RichText::new(country).color(to_color32(series_color(*idx)));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_country(country);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save chart configuration…").clicked() {
                save_view_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let has_chart = state.chart_rect.is_some();
        if ui
            .add_enabled(has_chart, egui::Button::new("Export PNG"))
            .clicked()
        {
            if let Some(rect) = state.chart_rect {
                if state.request_export(rect) {
                    ui.ctx()
                        .send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
                }
            }
        }
        if ui.add_enabled(has_chart, egui::Button::new("Reset zoom")).clicked() {
            state.request_reset_view();
        }

        ui.separator();

        if !state.dataset.is_empty() {
            ui.label(format!(
                "{} records, {} countries, {} selected",
                state.dataset.len(),
                state.dataset.domain.countries.len(),
                state.filters.selected().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Saved") {
                Color32::LIGHT_GREEN
            } else {
                Color32::RED
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open inflation data")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_view_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save chart configuration")
        .set_file_name("inflation_view.json")
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        state.save_view(path);
    }
}
