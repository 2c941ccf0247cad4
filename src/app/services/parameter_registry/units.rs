//! Unit conversions applied while resolving parameters
//!
//! A [`UnitConversion`] rewrites a column's values in place from one unit to
//! another. Conversions are registered per ordered `(from, to)` mnemonic pair
//! in a [`UnitConverterRegistry`]; units with no registered pair are never
//! converted.

use crate::app::models::{Column, DataFile, Decimal, Value};
use crate::app::services::depth::sigma;
use crate::constants::{APPROXIMATION_SALINITY, APPROXIMATION_TEMPERATURE, woce};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// In-place conversion of a column, given read access to the rest of its file
pub type ConversionFn = dyn Fn(&mut Column, &DataFile) -> Result<()> + Send + Sync;

/// Molar volume factor (l/umol scaled) for oxygen ml/l to umol/kg
const OXYGEN_ML_PER_UMOL: f64 = 0.022392;

/// Values below this are placeholders for missing data
const MISSING_BELOW: f64 = -3.0;

/// Salinity columns consulted by the oxygen conversion, in preference order
const SALINITY_COLUMNS: &[&str] = &["CTDSAL", "SALNTY"];

/// Temperature columns consulted by the oxygen conversion, in preference order
const TEMPERATURE_COLUMNS: &[&str] = &["CTDTMP", "THETA", "REVTMP"];

/// A registered conversion between two unit mnemonics
#[derive(Clone)]
pub struct UnitConversion {
    /// Source unit mnemonic
    pub from: String,

    /// Target unit mnemonic
    pub to: String,

    /// Description recorded in the file's change log
    pub technique: String,

    apply: Arc<ConversionFn>,
}

impl UnitConversion {
    /// Create a conversion from a function
    pub fn new<F>(
        from: impl Into<String>,
        to: impl Into<String>,
        technique: impl Into<String>,
        apply: F,
    ) -> Self
    where
        F: Fn(&mut Column, &DataFile) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            from: from.into(),
            to: to.into(),
            technique: technique.into(),
            apply: Arc::new(apply),
        }
    }

    /// Identity conversion between two names for the same unit
    pub fn equivalent(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, "equivalent units", |_, _| Ok(()))
    }

    /// Dissolved oxygen from ml/l to umol/kg
    ///
    /// Each value is divided by `0.022392 * (sigma_t / 1000 + 1)` where
    /// sigma_t is the zero-pressure density anomaly of the row's salinity and
    /// temperature. Missing or implausible salinity falls back to 34.8 and
    /// missing temperature to 25 deg C. Values below -3 are placeholders and
    /// become missing.
    pub fn oxygen_ml_per_l_to_umol_per_kg() -> Self {
        Self::new(
            "ML/L",
            "UMOL/KG",
            "EOS-80 sigma-t at 0 dbar",
            convert_oxygen_ml_per_l,
        )
    }

    /// Apply the conversion to a column of `file`
    pub fn apply(&self, column: &mut Column, file: &DataFile) -> Result<()> {
        (self.apply)(column, file)
    }
}

impl fmt::Debug for UnitConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitConversion")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("technique", &self.technique)
            .finish_non_exhaustive()
    }
}

fn first_value_of(file: &DataFile, names: &[&str], row: usize) -> Option<f64> {
    names
        .iter()
        .filter_map(|name| file.column(name))
        .find_map(|column| column.get(row).and_then(Value::as_f64))
}

fn convert_oxygen_ml_per_l(column: &mut Column, file: &DataFile) -> Result<()> {
    let name = column.name().to_string();
    if !name.contains("OXY") {
        return Err(Error::configuration(format!(
            "Cannot apply oxygen conversion to non-oxygen parameter {}",
            name
        )));
    }

    for row in 0..column.len() {
        let Some(value) = column.get(row).cloned() else {
            continue;
        };
        let Some(x) = value.as_f64() else {
            continue;
        };

        if x < MISSING_BELOW {
            column.values_mut()[row] = None;
            if column.is_flagged_woce() {
                column.set_flag_woce(row, woce::MISSING)?;
            }
            continue;
        }

        let salinity = match first_value_of(file, SALINITY_COLUMNS, row) {
            Some(s) if s > 0.0 => {
                if !(20.0..=60.0).contains(&s) {
                    warn!("Salinity ({}) is ridiculous at row {}", s, row);
                }
                s
            }
            _ => APPROXIMATION_SALINITY,
        };
        let temperature = match first_value_of(file, TEMPERATURE_COLUMNS, row) {
            Some(t) if t > MISSING_BELOW => t,
            _ => {
                warn!(
                    "Temperature is missing. Using {} at row {}",
                    APPROXIMATION_TEMPERATURE, row
                );
                APPROXIMATION_TEMPERATURE
            }
        };

        let sigma_t = sigma(salinity, temperature, 0.0);
        let converted = x / (OXYGEN_ML_PER_UMOL * (sigma_t / 1.0e3 + 1.0));
        column.values_mut()[row] = Some(match value {
            Value::Decimal(d) => Value::Decimal(Decimal::new(converted, d.places())),
            _ => Value::Float(converted),
        });
    }
    Ok(())
}

/// Conversions keyed by ordered `(from, to)` unit mnemonics
#[derive(Debug, Clone, Default)]
pub struct UnitConverterRegistry {
    converters: HashMap<(String, String), UnitConversion>,
}

impl UnitConverterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in conversions
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(UnitConversion::oxygen_ml_per_l_to_umol_per_kg());
        registry.register(UnitConversion::equivalent("PSU", "PSS-78"));
        registry.register(UnitConversion::equivalent("DEG C", "ITS-90"));
        registry
    }

    /// Register a conversion, replacing any for the same pair
    pub fn register(&mut self, conversion: UnitConversion) {
        self.converters
            .insert((conversion.from.clone(), conversion.to.clone()), conversion);
    }

    /// Conversion for an exact ordered pair
    pub fn get(&self, from: &str, to: &str) -> Option<&UnitConversion> {
        self.converters.get(&(from.to_string(), to.to_string()))
    }

    /// Number of registered conversions
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Whether no conversions are registered
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
