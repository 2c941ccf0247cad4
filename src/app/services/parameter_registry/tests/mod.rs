//! Shared test utilities and fixtures for parameter registry tests

use crate::app::models::{Column, DataFile, Parameter, Unit, Value};
use crate::app::services::parameter_registry::{
    ParameterRegistry, ParameterResolver, ResolutionReport, UnitConversion, UnitConverterRegistry,
};

pub mod units_tests;

/// Create a small registry with one aliased parameter and one override
pub fn create_test_registry() -> ParameterRegistry {
    let mut registry = ParameterRegistry::new();
    registry.insert(
        Parameter::new("CTDOXY")
            .with_units(Unit::new("micromole per kilogram", "UMOL/KG"))
            .with_format("%9.4f")
            .with_bounds(Some(0.0), Some(600.0))
            .with_display_order(17),
    );
    registry.insert(
        Parameter::new("CTDSAL")
            .with_units(Unit::new("Practical Salinity Scale 1978", "PSS-78"))
            .with_aliases(&["SALT"])
            .with_display_order(15),
    );
    registry.insert(
        Parameter::new("CTDTMP")
            .with_units(Unit::new("ITS-90 degrees Celsius", "ITS-90"))
            .with_display_order(14),
    );
    registry.insert_override(Parameter::new("EXPOCODE").with_display_order(1));
    registry.insert_override(Parameter::new("CTDNOBS").with_aliases(&["NUMBER"]));
    registry
}

/// Create a declared column filled with parsed values and default flags
pub fn create_declared_column(name: &str, units: Option<&str>, values: &[&str]) -> Column {
    let mut column = Column::declared(name, units);
    for raw in values {
        let value = (!raw.is_empty()).then(|| Value::parse(raw));
        column.append(value, None, None).unwrap();
    }
    column
}

/// Create a file from declared columns
pub fn create_test_file(columns: Vec<Column>) -> DataFile {
    let mut file = DataFile::new();
    for column in columns {
        file.insert_column(column);
    }
    file
}
