//! Presentation adapter: turns aggregation output into plain chart
//! configurations that the egui renderers in `ui` consume.

pub mod config;

pub use config::{ChartCapabilities, ChartKind, DashboardView, build_view, format_pct};
