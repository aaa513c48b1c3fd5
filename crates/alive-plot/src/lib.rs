//! Agents-alive charts for the team-size experiments.
//!
//! For every configured team size the generator reads
//! `<base>/<n>AgentTeams/team_records.csv`, drops the excluded AoA rows,
//! averages team size per turn and saves the line chart as
//! `<base>/<n>AgentTeams/agents_alive_plot.png`.
//!
//! ```text
//! team_records.csv ──▶ RecordSource ──▶ aggregate ──▶ ChartSink ──▶ agents_alive_plot.png
//! ```
//!
//! # Modules
//!
//! - [`config`]: TOML configuration and command line overrides
//! - [`paths`]: Per-team-size file layout
//! - [`chart`]: Chart description, sink trait and PNG rendering
//! - [`runner`]: The batch generator and run summary

pub mod chart;
pub mod config;
pub mod paths;
pub mod runner;

// Re-export config types
pub use config::{
    default_config_toml, ChartStyle, ConfigError, ConfigOverrides, PlotConfig, TomlSerializeError,
};

// Re-export chart types
pub use chart::{
    axis_ranges, chart_title, fonts_available, AliveChart, ChartError, ChartSink, PngChartSink,
};

pub use paths::{experiment_dir_name, ExperimentPaths};

pub use runner::{BatchPlotGenerator, PlotJobError, PlotOutcome, RunSummary};

use team_records::CsvRecordSource;

/// A generator reading CSV files and writing PNG charts.
pub fn png_generator(config: PlotConfig) -> BatchPlotGenerator<CsvRecordSource, PngChartSink> {
    let sink = PngChartSink::new(config.chart.clone());
    BatchPlotGenerator::new(config, CsvRecordSource::new(), sink)
}
