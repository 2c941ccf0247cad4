//! Tests for the merge and diff engine
//!
//! Fixtures build small bottle files keyed on STNNBR and SAMPNO, modelled on
//! a carbon-14 reprocessing update.

pub mod collections_tests;
pub mod diff_tests;

use crate::app::models::{Column, DataFile, DataFileCollection, RowKey, Value};
use crate::config::{DuplicateKeyPolicy, MergeConfig};

/// Create an unflagged identifier column
pub fn create_key_column(name: &str, values: &[i64]) -> Column {
    let mut column = Column::declared(name, None);
    for (row, value) in values.iter().enumerate() {
        column.put_raw(row, Some(Value::Integer(*value)), None, None);
    }
    column
}

/// Create a WOCE-flagged column from `(raw value, flag)` cells; an empty raw value is absent
pub fn create_flagged_column(name: &str, units: Option<&str>, cells: &[(&str, u8)]) -> Column {
    let mut column = Column::declared(name, units);
    for (raw, flag) in cells {
        let value = (!raw.is_empty()).then(|| Value::parse(raw));
        column.append(value, Some(*flag), None).unwrap();
    }
    column
}

/// Create a bottle file keyed on STNNBR and SAMPNO
pub fn create_bottle_file(stations: &[i64], samples: &[i64], columns: Vec<Column>) -> DataFile {
    let mut file = DataFile::new();
    file.insert_column(create_key_column("STNNBR", stations));
    file.insert_column(create_key_column("SAMPNO", samples));
    for column in columns {
        file.insert_column(column);
    }
    file
}

/// Origin: station 574 sample 36 has no DELC14 yet
pub fn create_origin_file() -> DataFile {
    let mut file = create_bottle_file(
        &[574, 574, 575],
        &[36, 35, 36],
        vec![
            create_flagged_column(
                "CTDSAL",
                Some("PSS-78"),
                &[("34.5000", 2), ("34.6000", 2), ("34.7000", 2)],
            ),
            create_flagged_column(
                "DELC14",
                Some("/MILLE"),
                &[("", 9), ("-150.5", 2), ("-160.2", 2)],
            ),
        ],
    );
    file.set_global("stamp", "20240101CCHSIOJFJ");
    file.set_global("header", "#code: original\n");
    file
}

/// Derivative: a new DELC14 for 574/36 and a station origin never had
pub fn create_derivative_file() -> DataFile {
    create_bottle_file(
        &[574, 600],
        &[36, 1],
        vec![create_flagged_column(
            "DELC14",
            Some("/MILLE"),
            &[("10.0", 9), ("5.0", 2)],
        )],
    )
}

/// Merge configuration with the given duplicate key policy
pub fn create_merge_config(policy: DuplicateKeyPolicy) -> MergeConfig {
    MergeConfig {
        duplicate_keys: policy,
        ..MergeConfig::default()
    }
}

/// Row key from integer parts
pub fn key(parts: &[i64]) -> RowKey {
    RowKey(parts.iter().map(|p| p.to_string()).collect())
}

/// Cast file identified by EXPOCODE, STNNBR and CASTNO globals
pub fn create_cast_file(station: i64, columns: Vec<Column>) -> DataFile {
    let samples: Vec<i64> = (1..=columns.first().map_or(0, Column::len) as i64).collect();
    let mut file = create_bottle_file(&vec![station; samples.len()], &samples, columns);
    file.set_global("EXPOCODE", "33RR20090320");
    file.set_global("STNNBR", station);
    file.set_global("CASTNO", 1i64);
    file
}

/// Collection from files
pub fn create_collection(files: Vec<DataFile>) -> DataFileCollection {
    DataFileCollection::from(files)
}
