//! Team records from the agent simulation and their per-turn aggregation.
//!
//! This crate holds the data model, the record-source seam with its CSV
//! implementation, and the exclusion filter plus group-by-mean that turns a
//! `team_records.csv` into an "agents alive" series. It knows nothing about
//! charts.

pub mod aggregate;
pub mod record;
pub mod source;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export record types
pub use record::{
    AggregatedPoint, RecordSet, TeamRecord, TeamSizeSeries, REQUIRED_COLUMNS, TEAM_AOA_COLUMN,
    TEAM_SIZE_COLUMN, TURN_NUMBER_COLUMN,
};

// Re-export aggregation
pub use aggregate::{aggregate, AoaFilter, DEFAULT_EXCLUDED_AOA};

// Re-export sources
pub use source::{records_from_frame, CsvRecordSource, MemoryRecordSource, RecordError, RecordSource};
