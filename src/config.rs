//! Runtime configuration.
//!
//! Read once at startup from the command line, with `INFLATION_*`
//! environment variables as fallbacks. Every option has a default so the
//! dashboard starts with no configuration at all.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueHint};

use crate::chart::{ChartCapabilities, ChartKind};
use crate::data::filter::DEFAULT_SELECTION;

pub const DEFAULT_DATA_FILE: &str = "inflation_data.json";

#[derive(Parser, Debug)]
#[command(
    name = "inflation-dashboard",
    version,
    about = "Country/year inflation dashboard",
    long_about = None
)]
struct Cli {
    /// Dataset loaded at startup (.json, .csv or .parquet)
    #[arg(
        env = "INFLATION_DATA",
        default_value = DEFAULT_DATA_FILE,
        value_hint = ValueHint::FilePath
    )]
    data: PathBuf,

    /// Directory PNG exports are written to
    #[arg(
        long,
        env = "INFLATION_EXPORT_DIR",
        default_value = ".",
        value_hint = ValueHint::DirPath
    )]
    export_dir: PathBuf,

    /// Chart type shown first
    #[arg(
        long,
        env = "INFLATION_CHART",
        value_enum,
        ignore_case = true,
        default_value = "line"
    )]
    chart: ChartKind,

    /// Draw the spread chart as a box plot (false forces the bar fallback)
    #[arg(
        long,
        env = "INFLATION_BOXPLOT",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "true"
    )]
    boxplot: bool,

    /// Number of countries selected after a load
    #[arg(long, env = "INFLATION_DEFAULT_SELECTION", default_value_t = DEFAULT_SELECTION)]
    default_selection: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Dataset loaded at startup.
    pub data_path: PathBuf,
    /// Directory PNG exports are written to.
    pub export_dir: PathBuf,
    /// Chart type shown first.
    pub chart_kind: ChartKind,
    /// Number of countries selected after a load.
    pub default_selection: usize,
    pub capabilities: ChartCapabilities,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            export_dir: PathBuf::from("."),
            chart_kind: ChartKind::default(),
            default_selection: DEFAULT_SELECTION,
            capabilities: ChartCapabilities::default(),
        }
    }
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        Self {
            data_path: cli.data,
            export_dir: cli.export_dir,
            chart_kind: cli.chart,
            default_selection: cli.default_selection,
            capabilities: ChartCapabilities {
                box_plot: cli.boxplot,
            },
        }
    }
}

impl DashboardConfig {
    /// Configuration from the process arguments and environment.
    /// Invalid input prints clap's usage error and exits.
    pub fn from_env() -> Self {
        Cli::parse().into()
    }

    /// Parse an explicit argument list. The first item is the binary name.
    /// Environment fallbacks still come from the process environment.
    pub fn from_sources<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(args).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching INFLATION_* variables must not interleave.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "INFLATION_DATA",
        "INFLATION_EXPORT_DIR",
        "INFLATION_CHART",
        "INFLATION_BOXPLOT",
        "INFLATION_DEFAULT_SELECTION",
    ];

    fn clear_env() {
        for key in VARS {
            std::env::remove_var(key);
        }
    }

    fn parse(args: &[&str]) -> Result<DashboardConfig, clap::Error> {
        let argv = std::iter::once("inflation-dashboard").chain(args.iter().copied());
        DashboardConfig::from_sources(argv)
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.data_path, PathBuf::from("inflation_data.json"));
        assert_eq!(cfg.default_selection, 8);
        assert!(cfg.capabilities.box_plot);
    }

    #[test]
    fn test_flags_and_positional_path() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cfg = parse(&[
            "--export-dir",
            "/tmp/out",
            "--chart",
            "BAR",
            "--boxplot",
            "off",
            "--default-selection",
            "3",
            "latam.csv",
        ])
        .unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("latam.csv"));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.chart_kind, ChartKind::Bar);
        assert!(!cfg.capabilities.box_plot);
        assert_eq!(cfg.default_selection, 3);
    }

    #[test]
    fn test_flag_value_is_not_taken_as_dataset() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cfg = parse(&["--export-dir", "/tmp/out"]).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_env_fallbacks_and_argument_precedence() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("INFLATION_DATA", "/data/latam.parquet");
        std::env::set_var("INFLATION_CHART", "scatter");
        std::env::set_var("INFLATION_BOXPLOT", "false");

        let from_env = parse(&[]);
        let from_arg = parse(&["from_arg.json"]);
        clear_env();

        let from_env = from_env.unwrap();
        assert_eq!(from_env.data_path, PathBuf::from("/data/latam.parquet"));
        assert_eq!(from_env.chart_kind, ChartKind::Scatter);
        assert!(!from_env.capabilities.box_plot);
        assert_eq!(from_arg.unwrap().data_path, PathBuf::from("from_arg.json"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        assert!(parse(&["--chart", "pie"]).is_err());
        assert!(parse(&["--boxplot", "maybe"]).is_err());
        assert!(parse(&["--default-selection", "many"]).is_err());
    }
}
