//! Record Sources
//!
//! Where team records come from. [`CsvRecordSource`] reads the CSV files the
//! simulation writes; [`MemoryRecordSource`] serves records already in memory.

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::{
    RecordSet, TeamRecord, REQUIRED_COLUMNS, TEAM_AOA_COLUMN, TEAM_SIZE_COLUMN,
    TURN_NUMBER_COLUMN,
};

/// Errors that can occur while loading team records.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("team records file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{}: column '{column}' {reason}", .path.display())]
    Schema {
        path: PathBuf,
        column: String,
        reason: String,
    },
}

impl RecordError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            RecordError::MissingFile { path }
            | RecordError::Read { path, .. }
            | RecordError::Schema { path, .. } => path,
        }
    }

    fn schema(path: &Path, column: &str, reason: impl Into<String>) -> Self {
        RecordError::Schema {
            path: path.to_path_buf(),
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

/// Anything that can produce the team records stored at a path.
pub trait RecordSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<RecordSet, RecordError>;
}

/// Reads `team_records.csv` files with polars.
///
/// The header row is required. Columns other than `TurnNumber`, `TeamAoA`
/// and `TeamSize` are ignored. Required columns are checked before any row
/// is converted, so a file missing one fails with [`RecordError::Schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRecordSource;

impl CsvRecordSource {
    pub fn new() -> Self {
        Self
    }

    /// Parses the CSV into a data frame.
    fn read_frame(path: &Path) -> Result<DataFrame, RecordError> {
        CsvReadOptions::default()
            .with_has_header(true)
            // Scan the entire file; leading rows may be empty or whole numbers
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|source| RecordError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl RecordSource for CsvRecordSource {
    fn load(&self, path: &Path) -> Result<RecordSet, RecordError> {
        if !path.is_file() {
            return Err(RecordError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let df = Self::read_frame(path)?;
        let record_set = records_from_frame(&df, path)?;

        tracing::debug!(
            "Loaded {} records from {} ({} skipped)",
            record_set.len(),
            path.display(),
            record_set.skipped_rows
        );
        if record_set.skipped_rows > 0 {
            tracing::warn!(
                "{}: skipped {} rows with an empty {} or unusable {}",
                path.display(),
                record_set.skipped_rows,
                TURN_NUMBER_COLUMN,
                TEAM_SIZE_COLUMN
            );
        }

        Ok(record_set)
    }
}

/// Converts a parsed frame into records.
///
/// Rows with an empty `TurnNumber`, or an empty or non-finite `TeamSize`,
/// cannot be placed on the chart and are counted in
/// [`RecordSet::skipped_rows`] instead. A turn whose every row is skipped
/// this way yields no point in the aggregated series.
pub fn records_from_frame(df: &DataFrame, path: &Path) -> Result<RecordSet, RecordError> {
    for name in REQUIRED_COLUMNS {
        if df.column(name).is_err() {
            return Err(RecordError::schema(path, name, "is missing"));
        }
    }

    // Header-only files carry no type information worth checking.
    if df.height() == 0 {
        return Ok(RecordSet::default());
    }

    let turns = integer_column(df, path, TURN_NUMBER_COLUMN)?;
    let aoas = float_column(df, path, TEAM_AOA_COLUMN)?;
    let sizes = float_column(df, path, TEAM_SIZE_COLUMN)?;

    let mut record_set = RecordSet::default();
    for ((turn, aoa), size) in turns.into_iter().zip(aoas).zip(sizes) {
        match (turn, size) {
            (Some(turn_number), Some(team_size)) if team_size.is_finite() => {
                record_set.records.push(TeamRecord {
                    turn_number,
                    team_aoa: aoa,
                    team_size,
                })
            }
            _ => record_set.skipped_rows += 1,
        }
    }

    Ok(record_set)
}

fn is_integer(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_numeric(dtype: &DataType) -> bool {
    is_integer(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Returns true when every cell of the column is empty.
fn all_null(column: &Column) -> bool {
    column.null_count() == column.len()
}

fn integer_column(df: &DataFrame, path: &Path, name: &str) -> Result<Vec<Option<i64>>, RecordError> {
    let column = df
        .column(name)
        .map_err(|_| RecordError::schema(path, name, "is missing"))?;

    if all_null(column) {
        return Ok(vec![None; column.len()]);
    }
    if !is_integer(column.dtype()) {
        return Err(RecordError::schema(
            path,
            name,
            format!("must hold integers, found {}", column.dtype()),
        ));
    }

    let read_err = |source: PolarsError| RecordError::Read {
        path: path.to_path_buf(),
        source,
    };
    let cast = column.cast(&DataType::Int64).map_err(read_err)?;
    let values = cast.i64().map_err(read_err)?;
    Ok(values.into_iter().collect())
}

fn float_column(df: &DataFrame, path: &Path, name: &str) -> Result<Vec<Option<f64>>, RecordError> {
    let column = df
        .column(name)
        .map_err(|_| RecordError::schema(path, name, "is missing"))?;

    if all_null(column) {
        return Ok(vec![None; column.len()]);
    }
    if !is_numeric(column.dtype()) {
        return Err(RecordError::schema(
            path,
            name,
            format!("must be numeric, found {}", column.dtype()),
        ));
    }

    let read_err = |source: PolarsError| RecordError::Read {
        path: path.to_path_buf(),
        source,
    };
    let cast = column.cast(&DataType::Float64).map_err(read_err)?;
    let values = cast.f64().map_err(read_err)?;
    Ok(values.into_iter().collect())
}

/// Serves record sets registered by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    sets: HashMap<PathBuf, RecordSet>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the records returned for `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, records: impl Into<RecordSet>) {
        self.sets.insert(path.into(), records.into());
    }

    /// Builder-style variant of [`MemoryRecordSource::insert`].
    pub fn with(mut self, path: impl Into<PathBuf>, records: impl Into<RecordSet>) -> Self {
        self.insert(path, records);
        self
    }
}

impl RecordSource for MemoryRecordSource {
    fn load(&self, path: &Path) -> Result<RecordSet, RecordError> {
        self.sets
            .get(path)
            .cloned()
            .ok_or_else(|| RecordError::MissingFile {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("team_records.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_basic_csv() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "TurnNumber,TeamAoA,TeamSize\n1,1,10\n1,5,2\n2,1,8\n",
        );

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(
            set.records,
            vec![
                TeamRecord::new(1, 1.0, 10.0),
                TeamRecord::new(1, 5.0, 2.0),
                TeamRecord::new(2, 1.0, 8.0),
            ]
        );
        assert_eq!(set.skipped_rows, 0);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "IterationNumber,TeamID,TurnNumber,TeamSize,TeamAoA\n0,abc,3,4.5,2\n",
        );

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(set.records, vec![TeamRecord::new(3, 2.0, 4.5)]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.csv");

        let err = CsvRecordSource::new().load(&path).unwrap_err();

        assert!(matches!(err, RecordError::MissingFile { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "TurnNumber,TeamSize\n1,10\n");

        let err = CsvRecordSource::new().load(&path).unwrap_err();

        match err {
            RecordError::Schema { column, .. } => assert_eq!(column, "TeamAoA"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_size_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "TurnNumber,TeamAoA,TeamSize\n1,1,big\n2,1,small\n");

        let err = CsvRecordSource::new().load(&path).unwrap_err();

        match err {
            RecordError::Schema { column, .. } => assert_eq!(column, "TeamSize"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_turn_is_schema_error() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "TurnNumber,TeamAoA,TeamSize\n1.5,1,3\n");

        let err = CsvRecordSource::new().load(&path).unwrap_err();

        assert!(matches!(err, RecordError::Schema { .. }));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "TurnNumber,TeamAoA,TeamSize\n");

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert!(set.is_empty());
        assert_eq!(set.skipped_rows, 0);
    }

    #[test]
    fn test_empty_cells() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "TurnNumber,TeamAoA,TeamSize\n1,,4\n,1,4\n2,1,\n3,2,6\n",
        );

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(
            set.records,
            vec![TeamRecord::without_aoa(1, 4.0), TeamRecord::new(3, 2.0, 6.0)]
        );
        assert_eq!(set.skipped_rows, 2);
    }

    #[test]
    fn test_nan_sizes_are_skipped() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "TurnNumber,TeamAoA,TeamSize\n1,1,NaN\n2,1,NaN\n2,1,3\n",
        );

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(set.records, vec![TeamRecord::new(2, 1.0, 3.0)]);
        assert_eq!(set.skipped_rows, 2);
    }

    #[test]
    fn test_late_fractional_size_is_read() {
        let dir = tempdir().unwrap();
        let mut content = String::from("TurnNumber,TeamAoA,TeamSize\n");
        for turn in 0..150 {
            content.push_str(&format!("{},1,3\n", turn));
        }
        content.push_str("150,1,4.5\n");
        let path = write_csv(dir.path(), &content);

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(set.len(), 151);
        assert_eq!(set.records[150], TeamRecord::new(150, 1.0, 4.5));
    }

    #[test]
    fn test_long_empty_aoa_prefix_is_read() {
        let dir = tempdir().unwrap();
        let mut content = String::from("TurnNumber,TeamAoA,TeamSize\n");
        for turn in 0..150 {
            content.push_str(&format!("{},,3\n", turn));
        }
        content.push_str("150,5,100\n");
        let path = write_csv(dir.path(), &content);

        let set = CsvRecordSource::new().load(&path).unwrap();

        assert_eq!(set.len(), 151);
        assert_eq!(set.records[0], TeamRecord::without_aoa(0, 3.0));
        assert_eq!(set.records[150], TeamRecord::new(150, 5.0, 100.0));
        assert_eq!(set.skipped_rows, 0);
    }

    #[test]
    fn test_memory_source() {
        let source = MemoryRecordSource::new()
            .with("/data/2AgentTeams/team_records.csv", vec![TeamRecord::new(1, 1.0, 2.0)]);

        let set = source
            .load(Path::new("/data/2AgentTeams/team_records.csv"))
            .unwrap();
        assert_eq!(set.len(), 1);

        let err = source
            .load(Path::new("/data/4AgentTeams/team_records.csv"))
            .unwrap_err();
        assert!(matches!(err, RecordError::MissingFile { .. }));
    }
}
