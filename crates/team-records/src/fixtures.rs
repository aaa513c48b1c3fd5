//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers from other
//! crates.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // team-records = { path = "../team-records", features = ["test-fixtures"] }
//!
//! use team_records::fixtures;
//!
//! let records = fixtures::scenario_records();
//! let csv = fixtures::SAMPLE_CSV;
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::record::TeamRecord;

/// Two iterations of a three-team experiment.
///
/// Four rows use AoA 5 and one row has an empty AoA. After the default
/// exclusion the per-turn means are 28/3, 22/3 and 5.5.
pub const SAMPLE_CSV: &str = include_str!("../tests/fixtures/team_records.csv");

/// Every row uses AoA 5, so nothing survives the default exclusion.
pub const EXCLUDED_ONLY_CSV: &str = include_str!("../tests/fixtures/excluded_only.csv");

/// Header row and nothing else.
pub const HEADER_ONLY_CSV: &str = "TurnNumber,TeamAoA,TeamSize\n";

/// Three-row scenario: the AoA 5 row at turn 1 is excluded.
pub fn scenario_records() -> Vec<TeamRecord> {
    vec![
        TeamRecord::new(1, 1.0, 10.0),
        TeamRecord::new(1, 5.0, 2.0),
        TeamRecord::new(2, 1.0, 8.0),
    ]
}

/// A shrinking population over `turns` turns, with a noisy AoA 5 team mixed in.
pub fn declining_population(turns: i64) -> Vec<TeamRecord> {
    let mut records = Vec::new();
    for turn in 0..turns {
        let alive = (turns - turn) as f64;
        records.push(TeamRecord::new(turn, 1.0, alive));
        records.push(TeamRecord::new(turn, 2.0, alive + 2.0));
        records.push(TeamRecord::new(turn, 5.0, 1000.0));
    }
    records
}

/// Writes `content` as `<base>/<team_size>AgentTeams/team_records.csv`.
///
/// Returns the path of the written file.
pub fn write_experiment_csv(base: &Path, team_size: u32, content: &str) -> io::Result<PathBuf> {
    let dir = base.join(format!("{}AgentTeams", team_size));
    fs::create_dir_all(&dir)?;
    let path = dir.join("team_records.csv");
    fs::write(&path, content)?;
    Ok(path)
}
