use clap::ValueEnum;
use serde::Serialize;

use crate::color::{
    SERIES_FILL_ALPHA, SLICE_FILL_ALPHA, SPREAD_FILL_ALPHA, placeholder_color, series_color,
};
use crate::data::aggregate::{Aggregation, DistributionCategory, DistributionSummary, KpiSummary};
use crate::data::domain::Domain;

/// Label of the placeholder category.
pub const NO_DATA_LABEL: &str = "No data";
/// Rendered in place of an undefined KPI.
pub const MISSING_VALUE: &str = "—";

// ---------------------------------------------------------------------------
// Chart kind and capabilities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::Line, ChartKind::Bar, ChartKind::Scatter];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Line => "Line",
            ChartKind::Bar => "Bar",
            ChartKind::Scatter => "Scatter",
        }
    }

    pub fn x_axis(self) -> AxisKind {
        match self {
            ChartKind::Scatter => AxisKind::Linear,
            _ => AxisKind::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Category,
    Linear,
}

/// What the rendering backend can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartCapabilities {
    pub box_plot: bool,
}

impl Default for ChartCapabilities {
    fn default() -> Self {
        Self { box_plot: true }
    }
}

/// Outcome of capability negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Supported,
    Fallback,
}

pub fn probe_box_plot(caps: &ChartCapabilities) -> Capability {
    if caps.box_plot {
        Capability::Supported
    } else {
        Capability::Fallback
    }
}

// ---------------------------------------------------------------------------
// Primary chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetData {
    /// One slot per label; `None` is a gap.
    Aligned(Vec<Option<f64>>),
    /// `(year, value)` pairs on a linear axis.
    Points(Vec<(i32, f64)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetConfig {
    pub label: String,
    pub color: [u8; 3],
    pub fill_alpha: f32,
    pub data: DatasetData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryChartConfig {
    pub kind: ChartKind,
    pub x_axis: AxisKind,
    /// Category labels. Empty for scatter charts.
    pub labels: Vec<i32>,
    pub datasets: Vec<DatasetConfig>,
}

impl PrimaryChartConfig {
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

fn country_color(domain: &Domain, country: &str) -> [u8; 3] {
    series_color(domain.country_index(country).unwrap_or(0))
}

pub fn primary_chart(agg: &Aggregation, domain: &Domain, kind: ChartKind) -> PrimaryChartConfig {
    let datasets = match kind {
        ChartKind::Scatter => agg
            .points
            .iter()
            .map(|s| DatasetConfig {
                label: s.country.clone(),
                color: country_color(domain, &s.country),
                fill_alpha: SERIES_FILL_ALPHA,
                data: DatasetData::Points(s.points.clone()),
            })
            .collect(),
        ChartKind::Line | ChartKind::Bar => agg
            .aligned
            .iter()
            .map(|s| DatasetConfig {
                label: s.country.clone(),
                color: country_color(domain, &s.country),
                fill_alpha: SERIES_FILL_ALPHA,
                data: DatasetData::Aligned(s.values.clone()),
            })
            .collect(),
    };
    let labels = match kind {
        ChartKind::Scatter => Vec::new(),
        _ => agg.years.clone(),
    };

    PrimaryChartConfig {
        kind,
        x_axis: kind.x_axis(),
        labels,
        datasets,
    }
}

// ---------------------------------------------------------------------------
// Proportion (doughnut) chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceConfig {
    pub label: String,
    pub value: f64,
    pub color: [u8; 3],
    pub fill_alpha: f32,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionChartConfig {
    pub slices: Vec<SliceConfig>,
}

impl ProportionChartConfig {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

fn placeholder_slice() -> SliceConfig {
    SliceConfig {
        label: NO_DATA_LABEL.to_string(),
        value: 1.0,
        color: placeholder_color(),
        fill_alpha: SLICE_FILL_ALPHA,
        placeholder: true,
    }
}

/// One slice per country, sized by its absolute-value mean.
pub fn proportion_chart(dist: &DistributionSummary, domain: &Domain) -> ProportionChartConfig {
    let slices: Vec<SliceConfig> = dist
        .categories()
        .into_iter()
        .map(|cat| match cat {
            DistributionCategory::Country(d) => SliceConfig {
                label: d.country.clone(),
                value: d.abs_mean,
                color: country_color(domain, &d.country),
                fill_alpha: SLICE_FILL_ALPHA,
                placeholder: false,
            },
            DistributionCategory::NoData => placeholder_slice(),
        })
        .collect();

    let total: f64 = slices.iter().map(|s| s.value).filter(|v| v.is_finite()).sum();
    if total <= 0.0 {
        return ProportionChartConfig {
            slices: vec![placeholder_slice()],
        };
    }
    ProportionChartConfig { slices }
}

// ---------------------------------------------------------------------------
// Spread chart: box plot, or bars when box plots are unavailable
// ---------------------------------------------------------------------------

/// Min, quartiles and max of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self {
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadCategory<T> {
    pub label: String,
    pub color: [u8; 3],
    pub placeholder: bool,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpreadChartConfig {
    BoxPlot {
        label: String,
        fill_alpha: f32,
        categories: Vec<SpreadCategory<FiveNumberSummary>>,
    },
    Bar {
        label: String,
        fill_alpha: f32,
        categories: Vec<SpreadCategory<f64>>,
    },
}

impl SpreadChartConfig {
    pub fn labels(&self) -> Vec<String> {
        match self {
            SpreadChartConfig::BoxPlot { categories, .. } => {
                categories.iter().map(|c| c.label.clone()).collect()
            }
            SpreadChartConfig::Bar { categories, .. } => {
                categories.iter().map(|c| c.label.clone()).collect()
            }
        }
    }
}

fn spread_category<T>(cat: &DistributionCategory<'_>, domain: &Domain, value: T) -> SpreadCategory<T> {
    match cat {
        DistributionCategory::Country(d) => SpreadCategory {
            label: d.country.clone(),
            color: country_color(domain, &d.country),
            placeholder: false,
            value,
        },
        DistributionCategory::NoData => SpreadCategory {
            label: NO_DATA_LABEL.to_string(),
            color: placeholder_color(),
            placeholder: true,
            value,
        },
    }
}

const ZERO_SUMMARY: FiveNumberSummary = FiveNumberSummary {
    min: 0.0,
    q1: 0.0,
    median: 0.0,
    q3: 0.0,
    max: 0.0,
};

pub fn spread_chart(
    dist: &DistributionSummary,
    domain: &Domain,
    capability: Capability,
) -> SpreadChartConfig {
    let categories = dist.categories();
    match capability {
        Capability::Supported => SpreadChartConfig::BoxPlot {
            label: "Distribution %".to_string(),
            fill_alpha: SPREAD_FILL_ALPHA,
            categories: categories
                .iter()
                .map(|cat| {
                    let summary = match cat {
                        DistributionCategory::Country(d) => {
                            FiveNumberSummary::from_values(&d.values).unwrap_or(ZERO_SUMMARY)
                        }
                        DistributionCategory::NoData => ZERO_SUMMARY,
                    };
                    spread_category(cat, domain, summary)
                })
                .collect(),
        },
        Capability::Fallback => SpreadChartConfig::Bar {
            label: "Mean %".to_string(),
            fill_alpha: SPREAD_FILL_ALPHA,
            categories: categories
                .iter()
                .map(|cat| {
                    let value = match cat {
                        DistributionCategory::Country(d) => d.abs_mean,
                        DistributionCategory::NoData => 1.0,
                    };
                    spread_category(cat, domain, value)
                })
                .collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// KPI display
// ---------------------------------------------------------------------------

/// `4.50%`, `12.3%`, or `—` when undefined.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            if v.abs() < 10.0 {
                format!("{v:.2}%")
            } else {
                format!("{v:.1}%")
            }
        }
        _ => MISSING_VALUE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDisplay {
    pub count: usize,
    pub mean: String,
    pub min: String,
    pub max: String,
}

impl From<&KpiSummary> for KpiDisplay {
    fn from(kpi: &KpiSummary) -> Self {
        KpiDisplay {
            count: kpi.count,
            mean: format_pct(kpi.mean),
            min: format_pct(kpi.min),
            max: format_pct(kpi.max),
        }
    }
}

// ---------------------------------------------------------------------------
// Full view
// ---------------------------------------------------------------------------

/// Every chart configuration for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub primary: PrimaryChartConfig,
    pub proportion: ProportionChartConfig,
    pub spread: SpreadChartConfig,
    pub kpi: KpiDisplay,
}

pub fn build_view(
    agg: &Aggregation,
    domain: &Domain,
    kind: ChartKind,
    caps: &ChartCapabilities,
) -> DashboardView {
    DashboardView {
        primary: primary_chart(agg, domain, kind),
        proportion: proportion_chart(&agg.distribution, domain),
        spread: spread_chart(&agg.distribution, domain, probe_box_plot(caps)),
        kpi: KpiDisplay::from(&agg.kpi),
    }
}
