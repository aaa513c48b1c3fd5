//! Filtering and per-turn aggregation.

use std::collections::BTreeMap;

use crate::record::{AggregatedPoint, TeamRecord, TeamSizeSeries};

/// AoA value excluded from the averages unless configured otherwise.
pub const DEFAULT_EXCLUDED_AOA: f64 = 5.0;

/// Drops records whose AoA matches one of the excluded values.
///
/// Matching is exact `f64` equality. A record without an AoA is never
/// excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct AoaFilter {
    excluded: Vec<f64>,
}

impl Default for AoaFilter {
    fn default() -> Self {
        Self::new(vec![DEFAULT_EXCLUDED_AOA])
    }
}

impl AoaFilter {
    pub fn new(excluded: Vec<f64>) -> Self {
        Self { excluded }
    }

    /// A filter that keeps every record.
    pub fn keep_all() -> Self {
        Self::new(Vec::new())
    }

    pub fn excluded(&self) -> &[f64] {
        &self.excluded
    }

    /// Returns true if the record survives the filter.
    pub fn keeps(&self, record: &TeamRecord) -> bool {
        match record.team_aoa {
            Some(aoa) => !self.excluded.iter().any(|&ex| aoa == ex),
            None => true,
        }
    }
}

/// Running sum for one turn.
#[derive(Debug, Clone, Copy, Default)]
struct TurnAccumulator {
    sum: f64,
    count: u64,
}

/// Filters records and averages team size per turn number.
///
/// The result holds one point per distinct turn among the kept records,
/// sorted ascending. If every record is excluded the series is empty.
/// Non-finite sizes are left out of the mean, and a turn with no finite
/// size gets no point.
pub fn aggregate(records: &[TeamRecord], filter: &AoaFilter) -> TeamSizeSeries {
    let mut by_turn: BTreeMap<i64, TurnAccumulator> = BTreeMap::new();
    let mut rows_excluded = 0;

    for record in records {
        if !filter.keeps(record) {
            rows_excluded += 1;
            continue;
        }
        if !record.team_size.is_finite() {
            continue;
        }
        let acc = by_turn.entry(record.turn_number).or_default();
        acc.sum += record.team_size;
        acc.count += 1;
    }

    let points = by_turn
        .into_iter()
        .map(|(turn, acc)| AggregatedPoint::new(turn, acc.sum / acc.count as f64))
        .collect();

    TeamSizeSeries {
        points,
        rows_read: records.len(),
        rows_excluded,
    }
}
