//! Chart rendering for agents-alive series.
//!
//! A chart is handed to a [`ChartSink`]. [`PngChartSink`] draws it with the
//! [`plotters`] bitmap backend: a single blue line of mean team size per
//! turn, title, axis descriptions and a light grid.
//!
//! Every call to [`PngChartSink::save`] builds its own drawing area and
//! flushes it before returning. Nothing drawn for one team size can leak into
//! the next chart.
//!
//! The image is drawn into a staging file beside the target and renamed over
//! it once drawing succeeds. A failed render leaves the previous chart alone.

use plotters::prelude::*;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use team_records::TeamSizeSeries;
use thiserror::Error;

use crate::config::ChartStyle;

pub const X_AXIS_LABEL: &str = "Turn Number";
pub const Y_AXIS_LABEL: &str = "Average Team Size";

const FONT_FAMILY: &str = "sans-serif";
const GRID_COLOR: RGBColor = RGBColor(200, 200, 200);
const LIGHT_GRID_COLOR: RGBColor = RGBColor(235, 235, 235);

/// Errors that can occur while saving a chart.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("cannot write chart to {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("failed to draw chart: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, ChartError>;

fn drawing_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Returns true when the chart font can be loaded.
///
/// Without a system font every caption and label fails to draw.
pub fn fonts_available() -> bool {
    (FONT_FAMILY, 20.0).into_font().box_size("0").is_ok()
}

/// Title used for a team size's chart.
pub fn chart_title(team_size: u32) -> String {
    format!("Agents Alive over Iteration with {} Agent Teams", team_size)
}

/// Everything needed to draw one team size's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct AliveChart {
    pub team_size: u32,
    pub title: String,
    pub series: TeamSizeSeries,
}

impl AliveChart {
    pub fn new(team_size: u32, series: TeamSizeSeries) -> Self {
        Self {
            team_size,
            title: chart_title(team_size),
            series,
        }
    }

    pub fn x_label(&self) -> &'static str {
        X_AXIS_LABEL
    }

    pub fn y_label(&self) -> &'static str {
        Y_AXIS_LABEL
    }
}

/// Destination for rendered charts.
pub trait ChartSink: Send + Sync {
    /// Writes the chart to `path`, replacing any existing file.
    fn save(&self, chart: &AliveChart, path: &Path) -> Result<()>;
}

/// Saves charts as PNG files.
#[derive(Debug, Clone, Default)]
pub struct PngChartSink {
    style: ChartStyle,
}

impl PngChartSink {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ChartStyle {
        &self.style
    }
}

impl ChartSink for PngChartSink {
    fn save(&self, chart: &AliveChart, path: &Path) -> Result<()> {
        ensure_writable_target(path)?;

        let staging = staging_path(path);
        if let Err(e) = render_png(chart, &self.style, &staging) {
            // The backend flushes whatever was drawn when dropped
            let _ = fs::remove_file(&staging);
            return Err(match e {
                ChartError::Write { reason, .. } => ChartError::Write {
                    path: path.to_path_buf(),
                    reason,
                },
                other => other,
            });
        }

        fs::rename(&staging, path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            ChartError::Write {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }
}

/// Hidden sibling of `path` that keeps its extension, so the encoder still
/// picks the image format from it.
fn staging_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    path.with_file_name(name)
}

/// Rejects targets whose folder is missing or that name a directory.
///
/// The bitmap backend only touches the file system when the image is
/// flushed, so checking first keeps the error tied to the path.
fn ensure_writable_target(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(ChartError::Write {
            path: path.to_path_buf(),
            reason: "target is a directory".to_string(),
        });
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ChartError::Write {
                path: path.to_path_buf(),
                reason: format!("directory {} does not exist", parent.display()),
            })
        }
        _ => Ok(()),
    }
}

/// Computes the x and y ranges for a series.
///
/// The x range spans the first to last turn. The y range is padded by 5% of
/// the value spread so the line does not sit on the frame. Only finite means
/// count. Degenerate inputs (empty series, single turn, constant value, no
/// finite mean) get a unit-wide range.
pub fn axis_ranges(series: &TeamSizeSeries) -> (Range<f64>, Range<f64>) {
    let x_range = match series.turn_range() {
        Some((first, last)) if first < last => first as f64..last as f64,
        Some((turn, _)) => turn as f64 - 1.0..turn as f64 + 1.0,
        None => 0.0..1.0,
    };

    let y_range = match series.value_range() {
        Some((min, max)) if min < max => {
            let pad = (max - min) * 0.05;
            min - pad..max + pad
        }
        Some((value, _)) => value - 1.0..value + 1.0,
        None => 0.0..1.0,
    };

    (x_range, y_range)
}

fn render_png(chart: &AliveChart, style: &ChartStyle, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();

    root.fill(&WHITE).map_err(drawing_error)?;

    let (x_range, y_range) = axis_ranges(&chart.series);

    let mut chart_context = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT_FAMILY, style.title_font_size))
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing_error)?;

    chart_context
        .configure_mesh()
        .x_desc(chart.x_label())
        .y_desc(chart.y_label())
        .axis_desc_style((FONT_FAMILY, style.label_font_size))
        .label_style((FONT_FAMILY, style.tick_font_size))
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|y: &f64| format!("{:.1}", y))
        .bold_line_style(&GRID_COLOR)
        .light_line_style(&LIGHT_GRID_COLOR)
        .draw()
        .map_err(drawing_error)?;

    if chart.series.is_empty() {
        tracing::warn!("{}: no turns left after filtering, drawing empty chart", chart.title);
    } else {
        chart_context
            .draw_series(LineSeries::new(
                chart.series.points.iter().map(|p| p.as_xy()),
                BLUE.stroke_width(style.line_width),
            ))
            .map_err(drawing_error)?;
    }

    root.present().map_err(|e| ChartError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(())
}
