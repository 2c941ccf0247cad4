//! Tests for collection pairing and merging

use super::*;
use crate::app::services::merge::{
    ColumnStatus, Merger, different_columns_for_collections, file_key, map_collections,
    merge_collections, merge_collections_with,
};
use crate::constants::PRESSURE_PARAMETERS;

fn cast_key(station: i64) -> RowKey {
    RowKey(vec!["33RR20090320".to_string(), station.to_string(), "1".to_string()])
}

fn oxygen_cast(station: i64, cells: &[(&str, u8)]) -> DataFile {
    create_cast_file(station, vec![create_flagged_column("OXYGEN", None, cells)])
}

#[test]
fn test_file_key_from_globals() {
    assert_eq!(file_key(&oxygen_cast(12, &[("200.1", 2)])), cast_key(12));
}

#[test]
fn test_map_collections_pairs_by_file_key() {
    let origin = create_collection(vec![
        oxygen_cast(1, &[("200.1", 2)]),
        oxygen_cast(2, &[("201.1", 2)]),
    ]);
    let derivative = create_collection(vec![
        oxygen_cast(3, &[("199.0", 2)]),
        oxygen_cast(1, &[("200.5", 2)]),
    ]);

    let map = map_collections(&origin, &derivative);
    let pairs: Vec<(RowKey, bool)> = map
        .pairs()
        .map(|pair| (pair.key.clone(), pair.derivative.is_some()))
        .collect();
    assert_eq!(pairs, vec![(cast_key(1), true), (cast_key(2), false)]);
    assert_eq!(map.unmatched_origin(), vec![cast_key(2)]);
    assert_eq!(map.unmatched_derivative(), &[cast_key(3)]);
}

#[test]
fn test_merge_collections_keeps_origin_files_only() {
    let origin = create_collection(vec![
        oxygen_cast(1, &[("200.1", 2)]),
        oxygen_cast(2, &[("201.1", 2)]),
    ]);
    let derivative = create_collection(vec![
        oxygen_cast(1, &[("200.5", 3)]),
        oxygen_cast(3, &[("199.0", 2)]),
    ]);

    let (merged, report) =
        merge_collections(&origin, &derivative, &["OXYGEN"], &MergeConfig::default());

    assert_eq!(merged.len(), 2);
    let first = merged.get(0).unwrap().column("OXYGEN").unwrap();
    assert_eq!(first.get(0), Some(&Value::parse("200.5")));
    assert_eq!(first.flag_woce(0), Some(2));
    assert_eq!(merged.get(1), origin.get(1));

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].0, cast_key(1));
    assert_eq!(report.unmatched_origin, vec![cast_key(2)]);
    assert_eq!(report.unmatched_derivative, vec![cast_key(3)]);
    assert!(report.is_complete());
}

#[test]
fn test_failed_file_merge_keeps_origin() {
    let origin = create_collection(vec![oxygen_cast(1, &[("200.1", 2)])]);
    let mut keyless = DataFile::new();
    keyless.set_global("EXPOCODE", "33RR20090320");
    keyless.set_global("STNNBR", 1i64);
    keyless.set_global("CASTNO", 1i64);
    keyless.insert_column(create_flagged_column("OXYGEN", None, &[("250.0", 2)]));
    let derivative = create_collection(vec![keyless]);

    let (merged, report) =
        merge_collections(&origin, &derivative, &["OXYGEN"], &MergeConfig::default());

    assert_eq!(merged.get(0), origin.get(0));
    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].key, cast_key(1));
    assert!(report.failures[0].error.contains("No common key columns"));
}

#[test]
fn test_different_columns_for_collections() {
    let origin = create_collection(vec![
        oxygen_cast(1, &[("200.1", 2)]),
        oxygen_cast(2, &[("201.1", 2)]),
    ]);
    let derivative = create_collection(vec![
        oxygen_cast(1, &[("200.1", 2)]),
        oxygen_cast(2, &[("201.1", 4)]),
    ]);

    let differences =
        different_columns_for_collections(&origin, &derivative, &MergeConfig::default()).unwrap();
    assert_eq!(differences.status("OXYGEN"), Some(ColumnStatus::Same));
    assert_eq!(differences.status("OXYGEN_FLAG_W"), Some(ColumnStatus::Different));
}

fn ctd_cast(station: i64, pressures: &[(&str, u8)], transmissometer: &[(&str, u8)]) -> DataFile {
    let mut file = DataFile::new();
    file.insert_column(create_flagged_column("CTDPRS", Some("DBAR"), pressures));
    file.insert_column(create_flagged_column("TRANSM", None, transmissometer));
    file.set_global("EXPOCODE", "33RR20090320");
    file.set_global("STNNBR", station);
    file.set_global("CASTNO", 1i64);
    file
}

#[test]
fn test_merge_ctd_collections_on_pressure() {
    let origin = create_collection(vec![ctd_cast(
        1,
        &[("2.0", 2), ("4.0", 2), ("6.0", 2)],
        &[("90.00", 2), ("89.50", 2), ("89.10", 2)],
    )]);
    let derivative = create_collection(vec![ctd_cast(
        1,
        &[("4.0", 2), ("6.0", 2)],
        &[("88.75", 2), ("88.20", 3)],
    )]);
    let config = MergeConfig::default();

    // no sample identifiers, so the bottle merge cannot key these casts
    let (_, bottle_report) = merge_collections(&origin, &derivative, &["TRANSM"], &config);
    assert_eq!(bottle_report.failures.len(), 1);

    let (merged, report) = merge_collections_with(&origin, &derivative, &["TRANSM"], |o, d| {
        Merger::for_ctd(o, d, PRESSURE_PARAMETERS, &config)
    });
    assert!(report.is_complete());
    assert_eq!(report.files[0].1.keys, vec!["CTDPRS".to_string()]);
    let transmissometer = merged.get(0).unwrap().column("TRANSM").unwrap();
    assert_eq!(transmissometer.get(0), Some(&Value::parse("90.00")));
    assert_eq!(transmissometer.get(1), Some(&Value::parse("88.75")));
    assert_eq!(transmissometer.get(2), Some(&Value::parse("88.20")));
    assert_eq!(transmissometer.flag_woce(2), Some(2));
}
