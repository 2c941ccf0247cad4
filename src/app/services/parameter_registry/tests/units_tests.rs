//! Tests for unit conversions and the converter registry

use super::*;
use crate::constants::woce;

#[test]
fn test_registry_keys_are_ordered_pairs() {
    let registry = UnitConverterRegistry::with_defaults();
    assert!(registry.get("ML/L", "UMOL/KG").is_some());
    assert!(registry.get("UMOL/KG", "ML/L").is_none());
    assert!(registry.get("PSU", "PSS-78").is_some());
}

#[test]
fn test_register_replaces_same_pair() {
    let mut registry = UnitConverterRegistry::new();
    registry.register(UnitConversion::equivalent("A", "B"));
    registry.register(UnitConversion::new("A", "B", "custom", |_, _| Ok(())));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("A", "B").unwrap().technique, "custom");
}

#[test]
fn test_oxygen_conversion_uses_row_salinity_and_temperature() {
    let file = create_test_file(vec![
        create_declared_column("CTDSAL", Some("PSS-78"), &["35.0", ""]),
        create_declared_column("CTDTMP", Some("ITS-90"), &["10.0", ""]),
    ]);
    let mut oxygen = create_declared_column("CTDOXY", Some("ML/L"), &["5.00", "5.00"]);

    UnitConversion::oxygen_ml_per_l_to_umol_per_kg()
        .apply(&mut oxygen, &file)
        .unwrap();

    let first = oxygen.get(0).unwrap().as_f64().unwrap();
    assert!((first - 217.43367).abs() < 1e-4, "got {}", first);
    // second row falls back to S = 34.8, T = 25
    let second = oxygen.get(1).unwrap().as_f64().unwrap();
    assert!((second - 218.23280).abs() < 1e-4, "got {}", second);
    assert_eq!(oxygen.get(0).unwrap().decimal_places(), Some(2));
}

#[test]
fn test_oxygen_placeholder_becomes_missing() {
    let file = DataFile::new();
    let mut oxygen = create_declared_column("OXYGEN", Some("ML/L"), &["-9.0", "6.5"]);
    UnitConversion::oxygen_ml_per_l_to_umol_per_kg()
        .apply(&mut oxygen, &file)
        .unwrap();
    assert_eq!(oxygen.get(0), None);
    assert_eq!(oxygen.flag_woce(0), Some(woce::MISSING));
    assert!((oxygen.get(1).unwrap().as_f64().unwrap() - 283.70264).abs() < 1e-4);
}

#[test]
fn test_oxygen_conversion_rejects_other_parameters() {
    let file = DataFile::new();
    let mut salinity = create_declared_column("CTDSAL", Some("ML/L"), &["35.0"]);
    assert!(
        UnitConversion::oxygen_ml_per_l_to_umol_per_kg()
            .apply(&mut salinity, &file)
            .is_err()
    );
}
