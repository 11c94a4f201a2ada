use eframe::egui::{self, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::chart::{ChartKind, format_pct};
use crate::chart::config::{DatasetConfig, DatasetData, PrimaryChartConfig};
use crate::color::{to_color32, with_alpha};
use crate::state::AppState;

/// Share of one year slot taken by a group of bars.
const BAR_GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Primary chart (central panel)
// ---------------------------------------------------------------------------

/// Render the primary inflation chart and remember where it was drawn.
pub fn primary_chart(ui: &mut Ui, state: &mut AppState, height: f32) {
    if state.dataset.is_empty() {
        ui.allocate_ui(egui::vec2(ui.available_width(), height), |ui: &mut Ui| {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a dataset to view inflation  (File → Open…)");
            });
        });
        state.chart_rect = None;
        return;
    }

    let reset = state.take_reset_view();
    let config = &state.view.primary;
    if config.is_empty() {
        ui.label(RichText::new("No countries selected.").weak());
    }

    let mut plot = Plot::new("primary_chart")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Annual inflation")
        .y_axis_formatter(|mark, _range| format!("{}%", mark.value))
        .label_formatter(|name, point| hover_label(name, point.x, point.y))
        .include_y(0.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if reset {
        plot = plot.reset();
    }

    let response = plot.show(ui, |plot_ui| match config.kind {
        ChartKind::Line | ChartKind::Scatter => {
            for ds in &config.datasets {
                for segment in line_segments(config, ds) {
                    plot_ui.line(
                        Line::new(PlotPoints::from(segment.clone()))
                            .name(&ds.label)
                            .color(to_color32(ds.color))
                            .width(2.0),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from(segment))
                            .name(&ds.label)
                            .color(to_color32(ds.color))
                            .radius(3.0),
                    );
                }
            }
        }
        ChartKind::Bar => {
            let n = config.datasets.len();
            for (i, ds) in config.datasets.iter().enumerate() {
                let (offset, width) = bar_slot(i, n);
                let bars: Vec<Bar> = aligned_points(config, ds)
                    .into_iter()
                    .map(|[x, y]| {
                        Bar::new(x + offset, y)
                            .name(&ds.label)
                            .width(width)
                            .fill(with_alpha(ds.color, ds.fill_alpha))
                            .stroke(Stroke::new(1.0, to_color32(ds.color)))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(&ds.label)
                        .color(to_color32(ds.color))
                        .highlight(false)
                        .element_formatter(Box::new(|bar, _chart| {
                            hover_label(&bar.name, bar.argument.round(), bar.value)
                        })),
                );
            }
        }
    });

    state.chart_rect = Some(response.response.rect);
}

/// Tooltip text: `Chile - 2020: 4.50%`. Hovering empty plot space has no name.
pub fn hover_label(name: &str, year: f64, value: f64) -> String {
    let pct = format_pct(Some(value));
    if name.is_empty() {
        format!("{year:.0}: {pct}")
    } else {
        format!("{name} - {year:.0}: {pct}")
    }
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Present values of an aligned dataset as `[year, value]`.
fn aligned_points(config: &PrimaryChartConfig, ds: &DatasetConfig) -> Vec<[f64; 2]> {
    match &ds.data {
        DatasetData::Aligned(values) => config
            .labels
            .iter()
            .zip(values)
            .filter_map(|(year, v)| v.map(|v| [*year as f64, v]))
            .collect(),
        DatasetData::Points(points) => points.iter().map(|&(x, y)| [x as f64, y]).collect(),
    }
}

/// Contiguous runs of a dataset. A missing year breaks an aligned line;
/// scatter points are joined as a single run.
pub fn line_segments(config: &PrimaryChartConfig, ds: &DatasetConfig) -> Vec<Vec<[f64; 2]>> {
    match &ds.data {
        DatasetData::Aligned(values) => split_on_gaps(&config.labels, values),
        DatasetData::Points(points) => {
            if points.is_empty() {
                Vec::new()
            } else {
                vec![points.iter().map(|&(x, y)| [x as f64, y]).collect()]
            }
        }
    }
}

pub fn split_on_gaps(labels: &[i32], values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();
    for (year, value) in labels.iter().zip(values) {
        match value {
            Some(v) => current.push([*year as f64, *v]),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Offset from the year and width of the `i`-th of `n` grouped bars.
pub fn bar_slot(i: usize, n: usize) -> (f64, f64) {
    let n = n.max(1) as f64;
    let width = BAR_GROUP_WIDTH / n;
    (-BAR_GROUP_WIDTH / 2.0 + width * (i as f64 + 0.5), width)
}
