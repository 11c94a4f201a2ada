use std::f32::consts::TAU;

use eframe::egui::{self, Color32, RichText, Sense, Stroke, Ui, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot};

use crate::chart::config::{KpiDisplay, ProportionChartConfig, SpreadChartConfig};
use crate::chart::format_pct;
use crate::color::{to_color32, with_alpha};
use crate::data::aggregate::DistributionSummary;

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

pub fn kpi_strip(ui: &mut Ui, kpi: &KpiDisplay) {
    ui.horizontal(|ui: &mut Ui| {
        kpi_card(ui, "Selected mean", &kpi.mean);
        kpi_card(ui, "Minimum", &kpi.min);
        kpi_card(ui, "Maximum", &kpi.max);
        ui.label(RichText::new(format!("{} observations", kpi.count)).weak());
    });
}

fn kpi_card(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small().weak());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Doughnut
// ---------------------------------------------------------------------------

/// Start and end angle (radians, clockwise from 12 o'clock) of each slice.
pub fn slice_angles(values: &[f64]) -> Vec<(f32, f32)> {
    let total: f64 = values.iter().filter(|v| v.is_finite() && **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0_f32;
    values
        .iter()
        .map(|v| {
            let share = if v.is_finite() && *v > 0.0 { *v / total } else { 0.0 };
            let end = start + share as f32 * TAU;
            let span = (start, end);
            start = end;
            span
        })
        .collect()
}

fn arc_points(center: egui::Pos2, radius: f32, start: f32, end: f32) -> Vec<egui::Pos2> {
    let steps = (((end - start) / TAU) * 96.0).ceil().max(2.0) as usize;
    (0..=steps)
        .map(|i| {
            let a = start + (end - start) * i as f32 / steps as f32;
            center + radius * vec2(a.sin(), -a.cos())
        })
        .collect()
}

pub fn proportion_chart(ui: &mut Ui, config: &ProportionChartConfig, size: f32) {
    ui.strong("Mean |inflation| by country");
    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(vec2(size, size), Sense::hover());
        let rect = response.rect;
        let ring = size * 0.18;
        let radius = size / 2.0 - ring / 2.0 - 2.0;

        let values: Vec<f64> = config.slices.iter().map(|s| s.value).collect();
        for (slice, (start, end)) in config.slices.iter().zip(slice_angles(&values)) {
            if end - start <= f32::EPSILON {
                continue;
            }
            let points = arc_points(rect.center(), radius, start, end);
            painter.add(egui::Shape::line(
                points,
                Stroke::new(ring, with_alpha(slice.color, slice.fill_alpha)),
            ));
        }

        if let Some(hover) = response.hover_pos() {
            let d = hover - rect.center();
            if (d.length() - radius).abs() <= ring / 2.0 {
                let angle = d.x.atan2(-d.y).rem_euclid(TAU);
                let hit = slice_angles(&values)
                    .iter()
                    .position(|(s, e)| angle >= *s && angle < *e);
                if let Some(slice) = hit.and_then(|i| config.slices.get(i)) {
                    response.on_hover_text(format!("{}: {}", slice.label, format_pct(Some(slice.value))));
                }
            }
        }

        ui.vertical(|ui: &mut Ui| {
            let total = config.total();
            for slice in &config.slices {
                let swatch = RichText::new("■").color(to_color32(slice.color));
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(swatch);
                    if slice.placeholder {
                        ui.label(RichText::new(&slice.label).italics().weak());
                    } else {
                        let share = if total > 0.0 { slice.value / total * 100.0 } else { 0.0 };
                        ui.label(format!("{}  ({share:.0}%)", slice.label));
                    }
                });
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Spread chart
// ---------------------------------------------------------------------------

pub fn spread_chart(ui: &mut Ui, config: &SpreadChartConfig, height: f32) {
    let labels = config.labels();
    let title = match config {
        SpreadChartConfig::BoxPlot { label, .. } | SpreadChartConfig::Bar { label, .. } => label,
    };
    ui.strong(title.as_str());

    Plot::new("spread_chart")
        .height(height)
        .legend(Legend::default())
        .show_grid([false, true])
        .y_axis_formatter(|mark, _range| format!("{}%", mark.value))
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| match config {
            SpreadChartConfig::BoxPlot {
                label,
                fill_alpha,
                categories,
            } => {
                let boxes: Vec<BoxElem> = categories
                    .iter()
                    .enumerate()
                    .map(|(i, cat)| {
                        let s = cat.value;
                        BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                            .name(&cat.label)
                            .box_width(0.6)
                            .fill(with_alpha(cat.color, *fill_alpha))
                            .stroke(Stroke::new(1.5, to_color32(cat.color)))
                    })
                    .collect();
                plot_ui.box_plot(BoxPlot::new(boxes).name(label));
            }
            SpreadChartConfig::Bar {
                label,
                fill_alpha,
                categories,
            } => {
                let bars: Vec<Bar> = categories
                    .iter()
                    .enumerate()
                    .map(|(i, cat)| {
                        Bar::new(i as f64, cat.value)
                            .name(&cat.label)
                            .width(0.6)
                            .fill(with_alpha(cat.color, *fill_alpha))
                            .stroke(Stroke::new(1.0, to_color32(cat.color)))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(label).color(Color32::GRAY));
            }
        });
}

// ---------------------------------------------------------------------------
// Distribution table
// ---------------------------------------------------------------------------

pub fn distribution_table(ui: &mut Ui, dist: &DistributionSummary) {
    if dist.is_empty() {
        ui.label(RichText::new("No data for the current selection.").weak());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(70.0), 4)
        .header(20.0, |mut header| {
            for title in ["Country", "Years", "Mean |%|", "Min", "Max"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for entry in &dist.entries {
                let min = entry.values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = entry.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let cells = [
                    entry.country.clone(),
                    entry.values.len().to_string(),
                    format_pct(Some(entry.abs_mean)),
                    format_pct(Some(min)),
                    format_pct(Some(max)),
                ];
                body.row(18.0, |mut row| {
                    for cell in &cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn test_slice_angles_cover_full_circle() {
        let spans = slice_angles(&[1.0, 3.0]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].0, 0.0);
        assert!((spans[0].1 - TAU / 4.0).abs() < 1e-5);
        assert!((spans[1].1 - TAU).abs() < 1e-5);
    }

    #[test]
    fn test_slice_angles_empty_for_zero_total() {
        assert!(slice_angles(&[0.0, 0.0]).is_empty());
        assert!(slice_angles(&[]).is_empty());
    }

    #[test]
    fn test_arc_points_start_at_top() {
        let pts = arc_points(pos2(0.0, 0.0), 10.0, 0.0, TAU / 4.0);
        assert!(pts.len() >= 3);
        assert!((pts[0].x).abs() < 1e-4 && (pts[0].y + 10.0).abs() < 1e-4);
        let last = pts[pts.len() - 1];
        assert!((last.x - 10.0).abs() < 1e-4 && last.y.abs() < 1e-4);
    }
}
