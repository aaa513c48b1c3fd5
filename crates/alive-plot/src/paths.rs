//! Experiment file layout.
//!
//! Each team size has its own folder under the base path:
//!
//! ```text
//! <base>/<n>AgentTeams/team_records.csv        input
//! <base>/<n>AgentTeams/agents_alive_plot.png   chart
//! <base>/<n>AgentTeams/agents_alive_series.json optional series export
//! ```

use std::path::{Path, PathBuf};

use crate::config::PlotConfig;

/// Folder name of a team size's experiment output.
pub fn experiment_dir_name(team_size: u32) -> String {
    format!("{}AgentTeams", team_size)
}

/// Resolved file paths for one team size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentPaths {
    pub team_size: u32,
    pub dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub series: PathBuf,
}

impl ExperimentPaths {
    /// Derives the paths from the base path and configured file names.
    pub fn new(config: &PlotConfig, team_size: u32) -> Self {
        Self::with_names(
            &config.base_path,
            team_size,
            &config.input_filename,
            &config.output_filename,
            &config.series_filename,
        )
    }

    pub fn with_names(
        base_path: &Path,
        team_size: u32,
        input_filename: &str,
        output_filename: &str,
        series_filename: &str,
    ) -> Self {
        let dir = base_path.join(experiment_dir_name(team_size));
        Self {
            team_size,
            input: dir.join(input_filename),
            output: dir.join(output_filename),
            series: dir.join(series_filename),
            dir,
        }
    }
}
