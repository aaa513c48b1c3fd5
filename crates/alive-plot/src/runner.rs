//! Batch plot generation.
//!
//! [`BatchPlotGenerator`] walks the configured team sizes and, for each one,
//! loads the records, aggregates them and hands the chart to a sink. Team
//! sizes share nothing, so they can be processed sequentially or on the rayon
//! pool.

use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use team_records::{aggregate, AoaFilter, RecordError, RecordSource, TeamSizeSeries};
use thiserror::Error;

use crate::chart::{AliveChart, ChartError, ChartSink};
use crate::config::PlotConfig;
use crate::paths::ExperimentPaths;

/// Failure while producing one team size's chart.
#[derive(Error, Debug)]
pub enum PlotJobError {
    #[error("team size {team_size}: {source}")]
    Records {
        team_size: u32,
        #[source]
        source: RecordError,
    },

    #[error("team size {team_size}: {source}")]
    Chart {
        team_size: u32,
        #[source]
        source: ChartError,
    },

    #[error("team size {team_size}: failed to export series to {}: {source}", .path.display())]
    Export {
        team_size: u32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("team size {team_size}: failed to serialize series: {source}")]
    Serialize {
        team_size: u32,
        #[source]
        source: serde_json::Error,
    },
}

impl PlotJobError {
    pub fn team_size(&self) -> u32 {
        match self {
            PlotJobError::Records { team_size, .. }
            | PlotJobError::Chart { team_size, .. }
            | PlotJobError::Export { team_size, .. }
            | PlotJobError::Serialize { team_size, .. } => *team_size,
        }
    }
}

/// Result of a successfully plotted team size.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutcome {
    pub paths: ExperimentPaths,
    pub series: TeamSizeSeries,
    /// Rows dropped at load for missing values
    pub skipped_rows: usize,
    /// Whether the series JSON was written
    pub series_exported: bool,
}

impl PlotOutcome {
    pub fn team_size(&self) -> u32 {
        self.paths.team_size
    }
}

/// What happened across a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Successful team sizes in configured order
    pub outcomes: Vec<PlotOutcome>,
    /// Failed team sizes in configured order
    pub failures: Vec<PlotJobError>,
    /// Team sizes never attempted because an earlier one failed
    pub not_attempted: Vec<u32>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.not_attempted.is_empty()
    }

    pub fn first_failure(&self) -> Option<&PlotJobError> {
        self.failures.first()
    }

    pub fn outcome(&self, team_size: u32) -> Option<&PlotOutcome> {
        self.outcomes.iter().find(|o| o.team_size() == team_size)
    }

    fn record(&mut self, result: Result<PlotOutcome, PlotJobError>) {
        match result {
            Ok(outcome) => self.outcomes.push(outcome),
            Err(err) => self.failures.push(err),
        }
    }
}

/// Generates one agents-alive chart per configured team size.
pub struct BatchPlotGenerator<S, K> {
    config: PlotConfig,
    filter: AoaFilter,
    source: S,
    sink: K,
}

impl<S: RecordSource, K: ChartSink> BatchPlotGenerator<S, K> {
    pub fn new(config: PlotConfig, source: S, sink: K) -> Self {
        let filter = config.aoa_filter();
        Self {
            config,
            filter,
            source,
            sink,
        }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Processes every configured team size.
    pub fn run(&self) -> RunSummary {
        tracing::info!(
            "Plotting {} team sizes from {}",
            self.config.team_sizes.len(),
            self.config.base_path.display()
        );

        let summary = if self.config.parallel {
            self.run_parallel()
        } else {
            self.run_sequential()
        };

        tracing::info!(
            "Finished: {} plotted, {} failed, {} not attempted",
            summary.outcomes.len(),
            summary.failures.len(),
            summary.not_attempted.len()
        );
        summary
    }

    fn run_sequential(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for (idx, &team_size) in self.config.team_sizes.iter().enumerate() {
            let result = self.plot_team_size(team_size);
            let failed = result.is_err();
            summary.record(result);

            if failed && self.config.fail_fast {
                summary.not_attempted = self.config.team_sizes[idx + 1..].to_vec();
                break;
            }
        }

        summary
    }

    /// Every team size is attempted; results keep configured order.
    fn run_parallel(&self) -> RunSummary {
        let results: Vec<_> = self
            .config
            .team_sizes
            .par_iter()
            .map(|&team_size| self.plot_team_size(team_size))
            .collect();

        let mut summary = RunSummary::default();
        for result in results {
            summary.record(result);
        }
        summary
    }

    /// Load, filter, aggregate, render and save one team size.
    pub fn plot_team_size(&self, team_size: u32) -> Result<PlotOutcome, PlotJobError> {
        let paths = ExperimentPaths::new(&self.config, team_size);
        tracing::info!("Team size {}: reading {}", team_size, paths.input.display());

        let result = self.plot_paths(paths);
        if let Err(e) = &result {
            tracing::error!("{}", e);
        }
        result
    }

    fn plot_paths(&self, paths: ExperimentPaths) -> Result<PlotOutcome, PlotJobError> {
        let team_size = paths.team_size;

        let record_set = self
            .source
            .load(&paths.input)
            .map_err(|source| PlotJobError::Records { team_size, source })?;

        let series = aggregate(&record_set.records, &self.filter);
        tracing::debug!(
            "Team size {}: {} rows, {} excluded, {} turns",
            team_size,
            series.rows_read,
            series.rows_excluded,
            series.len()
        );

        let chart = AliveChart::new(team_size, series);
        self.sink
            .save(&chart, &paths.output)
            .map_err(|source| PlotJobError::Chart { team_size, source })?;
        tracing::info!("Team size {}: wrote {}", team_size, paths.output.display());

        let series = chart.series;
        let series_exported = if self.config.export_series {
            export_series(&series, &paths)?;
            true
        } else {
            false
        };

        Ok(PlotOutcome {
            paths,
            series,
            skipped_rows: record_set.skipped_rows,
            series_exported,
        })
    }
}

/// Writes the series as pretty JSON, replacing any existing file.
fn export_series(series: &TeamSizeSeries, paths: &ExperimentPaths) -> Result<(), PlotJobError> {
    let team_size = paths.team_size;
    let json = series
        .to_json()
        .map_err(|source| PlotJobError::Serialize { team_size, source })?;

    fs::write(&paths.series, json).map_err(|source| PlotJobError::Export {
        team_size,
        path: paths.series.clone(),
        source,
    })?;

    tracing::debug!("Team size {}: exported {}", team_size, paths.series.display());
    Ok(())
}
