use std::path::{Path, PathBuf};

use eframe::egui::{ColorImage, Rect};

use crate::chart::{ChartKind, DashboardView, build_view};
use crate::config::DashboardConfig;
use crate::data::aggregate::{Aggregation, aggregate};
use crate::data::filter::FilterState;
use crate::data::loader;
use crate::data::model::InflationDataset;
use crate::export::{self, PendingExport};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (empty until a file loads successfully).
    pub dataset: InflationDataset,

    /// Year range and country selection.
    pub filters: FilterState,

    /// Primary chart type.
    pub chart_kind: ChartKind,

    /// Country search box text.
    pub country_query: String,

    /// Manual year inputs, applied with [`AppState::apply_year_inputs`].
    pub year_min_input: i32,
    pub year_max_input: i32,

    /// Aggregation for the current filters (cached).
    pub aggregation: Aggregation,

    /// Chart configurations built from `aggregation` (cached).
    pub view: DashboardView,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set by "Reset zoom", consumed by the next plot frame.
    pub reset_view_requested: bool,

    /// PNG export waiting for a screenshot.
    pub pending_export: Option<PendingExport>,

    /// Screen area of the primary chart in the last frame.
    pub chart_rect: Option<Rect>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let dataset = InflationDataset::default();
        let filters = FilterState::new(&dataset.domain, config.default_selection);
        let aggregation = Aggregation::default();
        let view = build_view(
            &aggregation,
            &dataset.domain,
            config.chart_kind,
            &config.capabilities,
        );
        Self {
            chart_kind: config.chart_kind,
            config,
            dataset,
            filters,
            country_query: String::new(),
            year_min_input: 0,
            year_max_input: 0,
            aggregation,
            view,
            status_message: None,
            reset_view_requested: false,
            pending_export: None,
            chart_rect: None,
        }
    }

    /// Load a dataset from disk. Failures are logged and leave the
    /// dashboard empty; they are never fatal.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records ({} dropped) from {}: {} countries, {} years",
                    dataset.len(),
                    dataset.dropped,
                    path.display(),
                    dataset.domain.countries.len(),
                    dataset.domain.years.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                log::warn!("Starting with an empty dashboard; use File → Open… to pick a dataset");
                self.set_dataset(InflationDataset::default());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the filters to their defaults.
    pub fn set_dataset(&mut self, dataset: InflationDataset) {
        self.filters = FilterState::new(&dataset.domain, self.config.default_selection);
        self.dataset = dataset;
        self.status_message = None;
        self.reset_view_requested = true;
        self.sync_year_inputs();
        self.refresh();
    }

    /// Copy the applied range into the manual inputs. Only range changes
    /// call this, so unapplied typing survives other filter actions.
    fn sync_year_inputs(&mut self) {
        if let Some(range) = self.filters.range() {
            self.year_min_input = range.min;
            self.year_max_input = range.max;
        }
    }

    /// Recompute aggregation and chart configs after any change.
    pub fn refresh(&mut self) {
        self.aggregation = aggregate(&self.dataset.records, &self.dataset.domain, &self.filters);
        self.view = build_view(
            &self.aggregation,
            &self.dataset.domain,
            self.chart_kind,
            &self.config.capabilities,
        );
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if self.chart_kind != kind {
            self.chart_kind = kind;
            self.reset_view_requested = true;
            self.refresh();
        }
    }

    // -- Year range --

    /// Apply the manual year inputs, snapping to existing years.
    pub fn apply_year_inputs(&mut self) {
        let (min, max) = (self.year_min_input, self.year_max_input);
        self.filters.set_year_range(&self.dataset.domain, min, max);
        self.sync_year_inputs();
        self.refresh();
    }

    /// Lower slider moved. It cannot pass the upper handle.
    pub fn set_min_year_index(&mut self, idx: usize) {
        let Some((_, hi)) = self.filters.year_index_range(&self.dataset.domain) else {
            return;
        };
        self.filters.set_year_index_range(&self.dataset.domain, idx.min(hi), hi);
        self.sync_year_inputs();
        self.refresh();
    }

    /// Upper slider moved. It cannot pass the lower handle.
    pub fn set_max_year_index(&mut self, idx: usize) {
        let Some((lo, _)) = self.filters.year_index_range(&self.dataset.domain) else {
            return;
        };
        self.filters.set_year_index_range(&self.dataset.domain, lo, idx.max(lo));
        self.sync_year_inputs();
        self.refresh();
    }

    // -- Countries --

    pub fn toggle_country(&mut self, country: &str) {
        self.filters.toggle_country(&self.dataset.domain, country);
        self.refresh();
    }

    pub fn select_all(&mut self) {
        self.filters.select_all(&self.dataset.domain);
        self.refresh();
    }

    pub fn clear_all(&mut self) {
        self.filters.clear_all();
        self.refresh();
    }

    /// Countries matching the search box, with their domain index.
    pub fn visible_countries(&self) -> Vec<(usize, &str)> {
        let query = self.country_query.trim().to_lowercase();
        self.dataset
            .domain
            .countries
            .iter()
            .enumerate()
            .filter(|(_, c)| query.is_empty() || c.to_lowercase().contains(&query))
            .map(|(i, c)| (i, c.as_str()))
            .collect()
    }

    // -- Export / view --

    pub fn request_reset_view(&mut self) {
        self.reset_view_requested = true;
    }

    /// Returns whether a reset was pending, clearing it.
    pub fn take_reset_view(&mut self) -> bool {
        std::mem::take(&mut self.reset_view_requested)
    }

    /// Queue a PNG export of the chart occupying `region`.
    /// Returns `false` when there is nothing to export.
    pub fn request_export(&mut self, region: Rect) -> bool {
        match export::export_path(&self.config.export_dir, self.filters.range()) {
            Ok(path) => {
                self.pending_export = Some(PendingExport { path, region });
                true
            }
            Err(e) => {
                log::warn!("Export skipped: {e}");
                self.status_message = Some(format!("Export skipped: {e}"));
                false
            }
        }
    }

    /// Write the pending export from a full-window screenshot.
    pub fn complete_export(&mut self, screenshot: &ColorImage, pixels_per_point: f32) {
        let Some(pending) = self.pending_export.take() else {
            return;
        };
        let image = export::crop(screenshot, pending.region, pixels_per_point);
        match export::save_png(&image, &pending.path) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {}", pending.path.display()));
            }
            Err(e) => {
                log::error!("Export to {} failed: {e}", pending.path.display());
                self.status_message = Some(format!("Export failed: {e}"));
            }
        }
    }

    pub fn save_view(&mut self, path: PathBuf) {
        if let Err(e) = export::save_view_json(&self.view, &path) {
            log::error!("Saving chart configuration failed: {e}");
            self.status_message = Some(format!("Save failed: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::domain::build_domain;
    use crate::data::model::CanonicalRecord;
    use eframe::egui::{Color32, pos2};

    fn dataset() -> InflationDataset {
        let records: Vec<CanonicalRecord> = [
            ("Chile", 2018, 2.0),
            ("Chile", 2019, 3.0),
            ("Chile", 2020, 4.0),
            ("Perú", 2019, 1.0),
            ("Ñandú", 2020, 9.0),
        ]
        .iter()
        .map(|(c, y, v)| CanonicalRecord {
            country: c.to_string(),
            year: *y,
            value_pct: *v,
        })
        .collect();
        let domain = build_domain(&records);
        InflationDataset {
            records,
            domain,
            dropped: 0,
        }
    }

    fn state() -> AppState {
        let mut s = AppState::new(DashboardConfig::default());
        s.set_dataset(dataset());
        s
    }

    #[test]
    fn test_set_dataset_applies_defaults() {
        let s = state();
        assert_eq!(s.filters.selected().len(), 3);
        assert_eq!((s.year_min_input, s.year_max_input), (2018, 2020));
        assert_eq!(s.aggregation.kpi.count, 5);
        assert_eq!(s.view.kpi.max, "9.00%");
    }

    #[test]
    fn test_new_state_is_empty_not_an_error() {
        let s = AppState::new(DashboardConfig::default());
        assert!(s.dataset.is_empty());
        assert_eq!(s.view.kpi.mean, crate::chart::config::MISSING_VALUE);
        assert!(s.view.primary.is_empty());
    }

    #[test]
    fn test_missing_file_leaves_empty_state() {
        let mut s = state();
        let dir = tempfile::tempdir().unwrap();
        s.load_path(&dir.path().join("inflation_data.json"));
        assert!(s.dataset.is_empty());
        assert!(s.status_message.is_some());
        assert_eq!(s.filters.range(), None);
    }

    #[test]
    fn test_apply_year_inputs_snaps_and_swaps() {
        let mut s = state();
        s.year_min_input = 2030;
        s.year_max_input = 2019;
        s.apply_year_inputs();
        assert_eq!((s.year_min_input, s.year_max_input), (2019, 2020));
        assert_eq!(s.aggregation.years, vec![2019, 2020]);
    }

    #[test]
    fn test_sliders_cannot_cross() {
        let mut s = state();
        s.set_max_year_index(1);
        assert_eq!(s.filters.year_index_range(&s.dataset.domain), Some((0, 1)));
        s.set_min_year_index(2);
        assert_eq!(s.filters.year_index_range(&s.dataset.domain), Some((1, 1)));
        s.set_max_year_index(0);
        assert_eq!(s.filters.year_index_range(&s.dataset.domain), Some((1, 1)));
    }

    #[test]
    fn test_unapplied_year_inputs_survive_other_actions() {
        let mut s = state();
        s.year_min_input = 2019;
        s.toggle_country("Perú");
        s.select_all();
        s.set_chart_kind(ChartKind::Bar);
        assert_eq!(s.year_min_input, 2019);
        assert_eq!(s.filters.range().map(|r| r.min), Some(2018));

        s.set_max_year_index(1);
        assert_eq!((s.year_min_input, s.year_max_input), (2018, 2019));
    }

    #[test]
    fn test_country_actions_refresh_view() {
        let mut s = state();
        s.clear_all();
        assert_eq!(s.aggregation.kpi.count, 0);
        assert_eq!(s.view.kpi.mean, "—");
        s.toggle_country("Perú");
        assert_eq!(s.aggregation.kpi.count, 1);
        s.select_all();
        assert_eq!(s.aggregation.kpi.count, 5);
    }

    #[test]
    fn test_country_search_is_case_insensitive() {
        let mut s = state();
        s.country_query = "  PER ".into();
        let hits = s.visible_countries();
        assert_eq!(hits, vec![(2, "Perú")]);
        s.country_query.clear();
        assert_eq!(s.visible_countries().len(), 3);
    }

    #[test]
    fn test_chart_kind_change_requests_reset() {
        let mut s = state();
        assert!(s.take_reset_view());
        assert!(!s.take_reset_view());
        s.set_chart_kind(ChartKind::Scatter);
        assert_eq!(s.view.primary.kind, ChartKind::Scatter);
        assert!(s.take_reset_view());
    }

    #[test]
    fn test_export_writes_png_named_after_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = AppState::new(DashboardConfig {
            export_dir: dir.path().to_path_buf(),
            ..DashboardConfig::default()
        });
        s.set_dataset(dataset());

        let region = Rect::from_min_max(pos2(0.0, 0.0), pos2(4.0, 4.0));
        assert!(s.request_export(region));
        let screenshot = ColorImage::new([8, 8], Color32::WHITE);
        s.complete_export(&screenshot, 1.0);

        assert!(s.pending_export.is_none());
        assert!(dir.path().join("inflation_2018-2020.png").exists());
    }

    #[test]
    fn test_export_without_data_is_skipped() {
        let mut s = AppState::new(DashboardConfig::default());
        let region = Rect::from_min_max(pos2(0.0, 0.0), pos2(4.0, 4.0));
        assert!(!s.request_export(region));
        assert!(s.pending_export.is_none());
    }
}
