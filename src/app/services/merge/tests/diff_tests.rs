//! Tests for column difference classification

use super::*;
use crate::app::models::Decimal;
use crate::app::services::merge::{
    ColumnDiffer, ColumnDifferences, ColumnPart, ColumnStatus, RowAlignment, cells_equal, equal_with_epsilon,
    parameter_mnemonics,
};
use crate::constants::DEFAULT_EPSILON;

fn classify(origin: &DataFile, derivative: &DataFile) -> ColumnDifferences {
    let alignment = RowAlignment::build(
        origin,
        derivative,
        &["STNNBR", "SAMPNO"],
        DuplicateKeyPolicy::Reject,
    )
    .unwrap();
    ColumnDiffer::new(&alignment, DEFAULT_EPSILON).different_columns(origin, derivative)
}

fn single_row(cells: Vec<Column>) -> DataFile {
    create_bottle_file(&[1], &[1], cells)
}

#[test]
fn test_split_pseudo_column_names() {
    assert_eq!(ColumnPart::split("DELC14"), ("DELC14", ColumnPart::Values));
    assert_eq!(ColumnPart::split("DELC14_FLAG_W"), ("DELC14", ColumnPart::FlagsWoce));
    assert_eq!(ColumnPart::split("PH_SWS_FLAG_I"), ("PH_SWS", ColumnPart::FlagsIgoss));
    assert_eq!(ColumnPart::split("PH_SWS"), ("PH_SWS", ColumnPart::Values));
}

#[test]
fn test_parameter_mnemonics_include_flag_columns() {
    let names: Vec<String> = parameter_mnemonics(&create_origin_file()).into_iter().collect();
    assert_eq!(
        names,
        vec!["STNNBR", "SAMPNO", "CTDSAL", "CTDSAL_FLAG_W", "DELC14", "DELC14_FLAG_W"]
    );
}

#[test]
fn test_equal_with_epsilon_is_relative() {
    assert!(equal_with_epsilon(0.0, 0.0, 1e-6));
    assert!(equal_with_epsilon(1000.0, 1000.0001, 1e-6));
    assert!(!equal_with_epsilon(1.0, 1.0001, 1e-6));
    assert!(!equal_with_epsilon(0.0, 1e-12, 1e-6));
}

#[test]
fn test_cells_require_same_precision() {
    let two = Value::Decimal(Decimal::new(2.0, 1));
    let two_hundredths = Value::Decimal(Decimal::new(2.0, 2));
    assert!(!cells_equal(Some(&two), Some(&two_hundredths), DEFAULT_EPSILON));
    assert!(cells_equal(Some(&two), Some(&two.clone()), DEFAULT_EPSILON));
    assert!(!cells_equal(Some(&two), None, DEFAULT_EPSILON));
    assert!(cells_equal(None, None, DEFAULT_EPSILON));
    assert!(cells_equal(
        Some(&Value::from("A")),
        Some(&Value::from("A")),
        DEFAULT_EPSILON
    ));
}

#[test]
fn test_differently_precise_decimals_are_different() {
    let origin = single_row(vec![create_flagged_column("SILCAT", None, &[("2.0", 2)])]);
    let derivative = single_row(vec![create_flagged_column("SILCAT", None, &[("2.00", 2)])]);

    let differences = classify(&origin, &derivative);
    assert_eq!(differences.status("SILCAT"), Some(ColumnStatus::Different));
    assert_eq!(differences.status("SILCAT_FLAG_W"), Some(ColumnStatus::Same));
}

#[test]
fn test_values_within_tolerance_are_same() {
    let origin = single_row(vec![create_flagged_column("CTDPRS", None, &[("1000.0000", 2)])]);
    let derivative = single_row(vec![create_flagged_column("CTDPRS", None, &[("1000.0001", 2)])]);

    let differences = classify(&origin, &derivative);
    assert_eq!(differences.status("CTDPRS"), Some(ColumnStatus::Same));
    assert!(differences.is_identical());
}

#[test]
fn test_flags_compared_independently_of_values() {
    let origin = single_row(vec![create_flagged_column("OXYGEN", None, &[("210.5", 2)])]);
    let derivative = single_row(vec![create_flagged_column("OXYGEN", None, &[("210.5", 3)])]);

    let differences = classify(&origin, &derivative);
    assert_eq!(differences.different, vec!["OXYGEN_FLAG_W".to_string()]);
    assert_eq!(differences.status("OXYGEN"), Some(ColumnStatus::Same));
}

#[test]
fn test_unit_change_makes_column_different() {
    let origin = single_row(vec![create_flagged_column("OXYGEN", Some("ML/L"), &[("5.0", 2)])]);
    let derivative =
        single_row(vec![create_flagged_column("OXYGEN", Some("UMOL/KG"), &[("5.0", 2)])]);

    assert_eq!(classify(&origin, &derivative).status("OXYGEN"), Some(ColumnStatus::Different));
}

#[test]
fn test_new_and_missing_columns() {
    let differences = classify(&create_origin_file(), &create_derivative_file());

    assert_eq!(differences.not_in_derivative, vec!["CTDSAL", "CTDSAL_FLAG_W"]);
    assert!(differences.not_in_origin.is_empty());
    // 574/36: absent vs 10.0
    assert_eq!(differences.different, vec!["DELC14".to_string()]);
    assert!(differences.common.contains(&"DELC14_FLAG_W".to_string()));
    assert!(differences.common.contains(&"STNNBR".to_string()));

    let reversed = classify(&create_derivative_file(), &create_origin_file());
    assert_eq!(reversed.status("CTDSAL"), Some(ColumnStatus::NewInDerivative));
}

#[test]
fn test_absorb_promotes_same_to_different() {
    let mut first = ColumnDifferences {
        common: vec!["DELC14".to_string()],
        ..Default::default()
    };
    let second = ColumnDifferences {
        different: vec!["DELC14".to_string()],
        not_in_origin: vec!["NITRAT".to_string()],
        ..Default::default()
    };
    first.absorb(second);
    assert_eq!(first.status("DELC14"), Some(ColumnStatus::Different));
    assert!(first.common.is_empty());
    assert_eq!(first.not_in_origin, vec!["NITRAT".to_string()]);
}
