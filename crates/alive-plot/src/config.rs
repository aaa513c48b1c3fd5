//! Configuration loading for the plot generator.
//!
//! Settings come from an optional TOML file; command line flags are layered
//! on top with [`ConfigOverrides`].

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use team_records::{AoaFilter, DEFAULT_EXCLUDED_AOA};

/// Base directory the experiment CSVs are exported to.
pub const DEFAULT_BASE_PATH: &str = "visualization_output/experiment_csv_data";

/// Team sizes the experiments were run with.
pub const DEFAULT_TEAM_SIZES: [u32; 6] = [2, 4, 5, 10, 25, 50];

pub const DEFAULT_INPUT_FILENAME: &str = "team_records.csv";
pub const DEFAULT_OUTPUT_FILENAME: &str = "agents_alive_plot.png";
pub const DEFAULT_SERIES_FILENAME: &str = "agents_alive_series.json";

/// Complete plot generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Directory holding one `<n>AgentTeams` folder per team size
    pub base_path: PathBuf,
    /// Team sizes to plot, in processing order
    pub team_sizes: Vec<u32>,
    /// CSV file name inside each experiment folder
    pub input_filename: String,
    /// PNG file name inside each experiment folder
    pub output_filename: String,
    /// JSON file name used when exporting the series
    pub series_filename: String,
    /// AoA values left out of the averages
    pub excluded_aoa: Vec<f64>,
    /// Stop at the first team size that fails
    pub fail_fast: bool,
    /// Process team sizes on a thread pool
    pub parallel: bool,
    /// Write the aggregated series next to the chart
    pub export_series: bool,
    /// Canvas and text sizes
    pub chart: ChartStyle,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            team_sizes: DEFAULT_TEAM_SIZES.to_vec(),
            input_filename: DEFAULT_INPUT_FILENAME.to_string(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            series_filename: DEFAULT_SERIES_FILENAME.to_string(),
            excluded_aoa: vec![DEFAULT_EXCLUDED_AOA],
            fail_fast: true,
            parallel: false,
            export_series: false,
            chart: ChartStyle::default(),
        }
    }
}

impl PlotConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Returns the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }

    /// Builds the AoA exclusion filter.
    pub fn aoa_filter(&self) -> AoaFilter {
        AoaFilter::new(self.excluded_aoa.clone())
    }

    /// Checks the configuration and drops repeated team sizes.
    ///
    /// The first occurrence of each team size keeps its position.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.team_sizes.is_empty() {
            return Err(ConfigError::Invalid("team_sizes must not be empty".into()));
        }
        if self.team_sizes.contains(&0) {
            return Err(ConfigError::Invalid("team sizes must be positive".into()));
        }

        let mut seen = HashSet::new();
        self.team_sizes.retain(|size| seen.insert(*size));

        for (name, value) in [
            ("input_filename", &self.input_filename),
            ("output_filename", &self.output_filename),
            ("series_filename", &self.series_filename),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", name)));
            }
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid(
                "chart width and height must be non-zero".into(),
            ));
        }
        if self.chart.line_width == 0 {
            return Err(ConfigError::Invalid("chart line_width must be non-zero".into()));
        }

        Ok(self)
    }
}

/// Canvas and text sizes of the rendered chart.
///
/// The defaults reproduce a 12x8 inch figure at 100 dpi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Stroke width of the series line
    pub line_width: u32,
    pub title_font_size: u32,
    /// Axis description size
    pub label_font_size: u32,
    /// Tick label size
    pub tick_font_size: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            line_width: 2,
            title_font_size: 32,
            label_font_size: 28,
            tick_font_size: 20,
        }
    }
}

/// Command line values that replace configured ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub base_path: Option<PathBuf>,
    /// Replaces the configured list when non-empty
    pub team_sizes: Vec<u32>,
    pub keep_going: bool,
    pub parallel: bool,
    pub export_series: bool,
}

impl ConfigOverrides {
    /// Applies the overrides. Flags only ever switch a setting on.
    pub fn apply(&self, config: &mut PlotConfig) {
        if let Some(base_path) = &self.base_path {
            config.base_path = base_path.clone();
        }
        if !self.team_sizes.is_empty() {
            config.team_sizes = self.team_sizes.clone();
        }
        if self.keep_going {
            config.fail_fast = false;
        }
        if self.parallel {
            config.parallel = true;
        }
        if self.export_series {
            config.export_series = true;
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
    /// Values that parse but cannot be used
    Invalid(String),
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Agents-alive plot configuration

# Directory holding one <n>AgentTeams folder per team size
base_path = "visualization_output/experiment_csv_data"
team_sizes = [2, 4, 5, 10, 25, 50]

input_filename = "team_records.csv"
output_filename = "agents_alive_plot.png"
series_filename = "agents_alive_series.json"

# Rows whose TeamAoA equals one of these are left out of the averages
excluded_aoa = [5.0]

fail_fast = true
parallel = false
export_series = false

[chart]
width = 1200
height = 800
line_width = 2
title_font_size = 32
label_font_size = 28
tick_font_size = 20
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlotConfig::default();

        assert_eq!(config.team_sizes, vec![2, 4, 5, 10, 25, 50]);
        assert_eq!(config.input_filename, "team_records.csv");
        assert_eq!(config.output_filename, "agents_alive_plot.png");
        assert_eq!(config.excluded_aoa, vec![5.0]);
        assert!(config.fail_fast);
        assert!(!config.parallel);
    }

    #[test]
    fn test_chart_style_default() {
        let chart = ChartStyle::default();

        assert_eq!((chart.width, chart.height), (1200, 800));
        assert_eq!(chart.line_width, 2);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            base_path = "/data"
            team_sizes = [10, 25]
            fail_fast = false

            [chart]
            width = 600
        "#;

        let config = PlotConfig::from_str(toml).unwrap();

        assert_eq!(config.base_path, PathBuf::from("/data"));
        assert_eq!(config.team_sizes, vec![10, 25]);
        assert!(!config.fail_fast);
        assert_eq!(config.chart.width, 600);
        // Unspecified values keep their defaults
        assert_eq!(config.chart.height, 800);
        assert_eq!(config.output_filename, "agents_alive_plot.png");
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = PlotConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, PlotConfig::default());
    }

    #[test]
    fn test_config_to_toml_round_trip() {
        let config = PlotConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[chart]"));
        assert_eq!(PlotConfig::from_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let result = PlotConfig::from_str("team_sizes = \"all\"");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_validated_dedups_in_order() {
        let config = PlotConfig {
            team_sizes: vec![10, 2, 10, 4, 2],
            ..PlotConfig::default()
        };

        let config = config.validated().unwrap();

        assert_eq!(config.team_sizes, vec![10, 2, 4]);
    }

    #[test]
    fn test_validated_rejects_bad_values() {
        let empty = PlotConfig {
            team_sizes: vec![],
            ..PlotConfig::default()
        };
        assert!(matches!(empty.validated(), Err(ConfigError::Invalid(_))));

        let zero = PlotConfig {
            team_sizes: vec![2, 0],
            ..PlotConfig::default()
        };
        assert!(matches!(zero.validated(), Err(ConfigError::Invalid(_))));

        let mut no_output = PlotConfig::default();
        no_output.output_filename = "  ".into();
        assert!(matches!(no_output.validated(), Err(ConfigError::Invalid(_))));

        let mut flat = PlotConfig::default();
        flat.chart.height = 0;
        assert!(matches!(flat.validated(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = PlotConfig::default();
        let overrides = ConfigOverrides {
            base_path: Some(PathBuf::from("/data")),
            team_sizes: vec![10],
            keep_going: true,
            parallel: true,
            export_series: true,
        };

        overrides.apply(&mut config);

        assert_eq!(config.base_path, PathBuf::from("/data"));
        assert_eq!(config.team_sizes, vec![10]);
        assert!(!config.fail_fast);
        assert!(config.parallel);
        assert!(config.export_series);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut config = PlotConfig::from_str("team_sizes = [4]\nparallel = true").unwrap();
        let before = config.clone();

        ConfigOverrides::default().apply(&mut config);

        assert_eq!(config, before);
    }

    #[test]
    fn test_aoa_filter_from_config() {
        let config = PlotConfig::from_str("excluded_aoa = []").unwrap();
        assert!(config.aoa_filter().excluded().is_empty());
    }
}
