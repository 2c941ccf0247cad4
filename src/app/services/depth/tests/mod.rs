//! Shared test utilities and fixtures for depth derivation tests

use crate::app::models::{DataFile, Value};

pub mod chain_tests;
pub mod eos80_tests;
pub mod unesco_tests;

/// Assert two floats agree to within an absolute tolerance
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {} but got {}",
        expected,
        tolerance,
        actual
    );
}

/// Create a CTD cast with pressure, salinity and temperature columns
pub fn create_test_cast(levels: &[(&str, &str, &str)], latitude: Option<f64>) -> DataFile {
    let mut file = DataFile::new();
    file.create_columns(["CTDPRS", "CTDSAL", "CTDTMP"], None, true);
    for (pressure, salinity, temperature) in levels {
        for (name, raw) in [("CTDPRS", pressure), ("CTDSAL", salinity), ("CTDTMP", temperature)] {
            let value = if raw.is_empty() {
                None
            } else {
                Some(Value::parse(raw))
            };
            file.ensure_column(name).append(value, None, None).unwrap();
        }
    }
    if let Some(latitude) = latitude {
        file.set_global("LATITUDE", latitude);
    }
    file
}
