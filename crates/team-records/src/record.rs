//! Record Types
//!
//! Rows of a `team_records.csv` file and the per-turn series derived from them.

use serde::{Deserialize, Serialize};

/// CSV column holding the simulation step.
pub const TURN_NUMBER_COLUMN: &str = "TurnNumber";

/// CSV column holding the team's articles-of-association id.
pub const TEAM_AOA_COLUMN: &str = "TeamAoA";

/// CSV column holding the number of agents alive in the team.
pub const TEAM_SIZE_COLUMN: &str = "TeamSize";

/// Columns every team records file must provide.
pub const REQUIRED_COLUMNS: [&str; 3] = [TURN_NUMBER_COLUMN, TEAM_AOA_COLUMN, TEAM_SIZE_COLUMN];

/// One row of a team records file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// Simulation step this row was recorded at
    pub turn_number: i64,
    /// Articles-of-association id, if the row has one
    pub team_aoa: Option<f64>,
    /// Agents alive in the team
    pub team_size: f64,
}

impl TeamRecord {
    /// Creates a record with a known AoA.
    pub fn new(turn_number: i64, team_aoa: f64, team_size: f64) -> Self {
        Self {
            turn_number,
            team_aoa: Some(team_aoa),
            team_size,
        }
    }

    /// Creates a record whose AoA cell was empty.
    pub fn without_aoa(turn_number: i64, team_size: f64) -> Self {
        Self {
            turn_number,
            team_aoa: None,
            team_size,
        }
    }
}

/// All usable records read from one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    /// Rows that can be aggregated, in file order
    pub records: Vec<TeamRecord>,
    /// Rows dropped because `TurnNumber` was empty or `TeamSize` was empty
    /// or not finite
    pub skipped_rows: usize,
}

impl RecordSet {
    /// Wraps records with no skipped rows.
    pub fn new(records: Vec<TeamRecord>) -> Self {
        Self {
            records,
            skipped_rows: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<TeamRecord>> for RecordSet {
    fn from(records: Vec<TeamRecord>) -> Self {
        Self::new(records)
    }
}

/// Mean team size at a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    /// Simulation step
    pub turn_number: i64,
    /// Mean `TeamSize` over the kept rows of this turn
    pub mean_team_size: f64,
}

impl AggregatedPoint {
    /// Creates a point for a turn.
    pub fn new(turn_number: i64, mean_team_size: f64) -> Self {
        Self {
            turn_number,
            mean_team_size,
        }
    }

    /// Returns the point as plot coordinates.
    pub fn as_xy(&self) -> (f64, f64) {
        (self.turn_number as f64, self.mean_team_size)
    }
}

/// Average team size per turn, ascending by turn number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSizeSeries {
    pub points: Vec<AggregatedPoint>,
    /// Records handed to the aggregation
    pub rows_read: usize,
    /// Records dropped by the AoA exclusion
    pub rows_excluded: usize,
}

impl TeamSizeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Finds the point for a turn.
    pub fn point_at(&self, turn_number: i64) -> Option<&AggregatedPoint> {
        self.points
            .binary_search_by_key(&turn_number, |p| p.turn_number)
            .ok()
            .map(|idx| &self.points[idx])
    }

    /// Inclusive range of turn numbers covered, if any.
    pub fn turn_range(&self) -> Option<(i64, i64)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.turn_number, last.turn_number)),
            _ => None,
        }
    }

    /// Smallest and largest finite mean team size, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut finite = self
            .points
            .iter()
            .map(|p| p.mean_team_size)
            .filter(|v| v.is_finite());
        let first = finite.next()?;
        Some(finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Serializes the series to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
