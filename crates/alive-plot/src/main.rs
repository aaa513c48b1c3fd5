//! Agents-alive plot generator
//!
//! Run with: cargo run -p alive-plot
//!
//! Examples:
//!   cargo run -p alive-plot -- --base-path visualization_output/experiment_csv_data
//!   cargo run -p alive-plot -- --team-size 10 --team-size 25 --keep-going
//!   cargo run -p alive-plot -- --print-default-config > plots.toml

use alive_plot::{
    default_config_toml, fonts_available, png_generator, ConfigOverrides, PlotConfig,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments for the plot generator
#[derive(Parser, Debug)]
#[command(name = "alive_plot")]
#[command(about = "Plot average team size per turn for each agent-team experiment")]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the <n>AgentTeams folders
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Team size to plot; repeat to plot several
    #[arg(long = "team-size", value_parser = clap::value_parser!(u32).range(1..))]
    team_sizes: Vec<u32>,

    /// Continue with the remaining team sizes after a failure
    #[arg(long)]
    keep_going: bool,

    /// Process team sizes in parallel
    #[arg(long)]
    parallel: bool,

    /// Also write the aggregated series as JSON next to each chart
    #[arg(long)]
    export_series: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_path: self.base_path.clone(),
            team_sizes: self.team_sizes.clone(),
            keep_going: self.keep_going,
            parallel: self.parallel,
            export_series: self.export_series,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alive_plot=info,team_records=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match PlotConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Could not load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => PlotConfig::default(),
    };
    args.overrides().apply(&mut config);

    let config = match config.validated() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if !fonts_available() {
        tracing::warn!("No usable sans-serif font found; chart text will fail to draw");
    }

    let summary = png_generator(config).run();

    for outcome in &summary.outcomes {
        tracing::info!(
            "{}: {} turns ({} rows, {} excluded) -> {}",
            outcome.team_size(),
            outcome.series.len(),
            outcome.series.rows_read,
            outcome.series.rows_excluded,
            outcome.paths.output.display()
        );
    }
    if !summary.not_attempted.is_empty() {
        tracing::warn!(
            "Skipped team sizes {:?} after the first failure (use --keep-going to continue)",
            summary.not_attempted
        );
    }

    if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
