use eframe::egui::{self, Ui};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, summary};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct InflationDashboardApp {
    pub state: AppState,
}

impl InflationDashboardApp {
    /// Create the app and load the configured dataset. A missing or broken
    /// file leaves the dashboard empty.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        let path = state.config.data_path.clone();
        state.load_path(&path);
        Self { state }
    }

    /// Finish a PNG export once the screenshot requested last frame arrives.
    fn handle_screenshots(&mut self, ctx: &egui::Context) {
        if self.state.pending_export.is_none() {
            return;
        }
        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(image) = screenshot {
            self.state.complete_export(&image, ctx.pixels_per_point());
        }
    }
}

impl eframe::App for InflationDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_screenshots(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, primary chart, summaries ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &mut self.state;
            summary::kpi_strip(ui, &state.view.kpi);
            ui.add_space(6.0);

            let primary_height = (ui.available_height() * 0.55).max(220.0);
            plot::primary_chart(ui, state, primary_height);
            ui.separator();

            if state.dataset.is_empty() {
                return;
            }
            let secondary_height = (ui.available_height() - 40.0).clamp(160.0, 320.0);
            ui.columns(2, |cols: &mut [Ui]| {
                summary::proportion_chart(&mut cols[0], &state.view.proportion, secondary_height * 0.8);
                summary::spread_chart(&mut cols[1], &state.view.spread, secondary_height);
            });
            egui::CollapsingHeader::new("Distribution by country")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    summary::distribution_table(ui, &state.aggregation.distribution);
                });
        });
    }
}
