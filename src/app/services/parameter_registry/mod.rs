//! Parameter registry service for canonical parameter lookups
//!
//! The registry maps a raw column name to its canonical [`Parameter`]. Lookup
//! tries, in order, the canonical name, a registered alias, and finally a
//! small fixed override table for identifiers the catalog does not describe
//! (EXPOCODE, SECT_ID, CTDNOBS).
//!
//! Registries are plain values passed to [`ParameterResolver`]; there is no
//! process-wide catalog.

use crate::app::models::{Parameter, ParameterOrigin, Unit};
use crate::constants::{CONTRIVED_FORMAT, UNORDERED};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

pub mod resolution;
pub mod units;

#[cfg(test)]
pub mod tests;

// Re-export key types for convenience
pub use resolution::{ParameterResolver, ResolutionReport, UnitMismatch};
pub use units::{UnitConversion, UnitConverterRegistry};

/// Canonical parameter catalog with alias and override lookup
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    /// Canonical parameters keyed by name, in insertion order
    pub(crate) parameters: IndexMap<String, Parameter>,

    /// Alias to canonical name
    pub(crate) aliases: HashMap<String, String>,

    /// Fixed fallback entries consulted after canonical names and aliases
    pub(crate) overrides: IndexMap<String, Parameter>,
}

/// Serialized form of a registry
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    overrides: Vec<Parameter>,
}

impl ParameterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canonical parameter and its aliases, replacing any entry of the same name
    pub fn insert(&mut self, mut parameter: Parameter) {
        parameter.origin = ParameterOrigin::Canonical;
        for alias in &parameter.aliases {
            self.aliases.insert(alias.clone(), parameter.name.clone());
        }
        self.parameters.insert(parameter.name.clone(), parameter);
    }

    /// Add an override table entry
    pub fn insert_override(&mut self, mut parameter: Parameter) {
        parameter.origin = ParameterOrigin::Canonical;
        self.overrides.insert(parameter.name.clone(), parameter);
    }

    /// Number of canonical parameters (overrides excluded)
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the registry has no canonical parameters
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Canonical parameter by exact name
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Canonical parameters in insertion order
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    /// Resolve a raw name to its canonical parameter
    pub fn resolve(&self, raw: &str) -> Result<Parameter> {
        let name = raw.trim();

        if let Some(parameter) = self.parameters.get(name) {
            return Ok(parameter.clone());
        }

        if let Some(canonical) = self.aliases.get(name) {
            if let Some(parameter) = self.parameters.get(canonical) {
                info!("{} is an alias for {}", name, parameter);
                return Ok(parameter.clone());
            }
        }

        if let Some(parameter) = self
            .overrides
            .values()
            .find(|parameter| parameter.answers_to(name))
        {
            debug!("{} resolved from the override table", name);
            return Ok(parameter.clone());
        }

        Err(Error::unknown_parameter(name))
    }

    /// Load a registry from a JSON document `{"parameters": [...], "overrides": [...]}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: RegistryDocument = serde_json::from_str(json)
            .map_err(|e| Error::registry_load("Invalid parameter registry document", e))?;

        let mut registry = Self::new();
        for parameter in document.parameters {
            registry.insert(parameter);
        }
        for parameter in document.overrides {
            registry.insert_override(parameter);
        }
        info!(
            "Loaded parameter registry with {} parameters and {} overrides",
            registry.parameters.len(),
            registry.overrides.len()
        );
        Ok(registry)
    }

    /// Serialize the registry to the JSON document read by [`ParameterRegistry::from_json_str`]
    pub fn to_json_string(&self) -> Result<String> {
        let document = RegistryDocument {
            parameters: self.parameters.values().cloned().collect(),
            overrides: self.overrides.values().cloned().collect(),
        };
        serde_json::to_string_pretty(&document)
            .map_err(|e| Error::registry_load("Failed to serialize parameter registry", e))
    }

    /// Built-in catalog of common WOCE/CCHDO hydrographic parameters
    pub fn woce_defaults() -> Self {
        let mut registry = Self::new();

        for parameter in [
            unitless("STNNBR", "Station Number", "%8s", 3),
            unitless("CASTNO", "Cast Number", "%8d", 4),
            unitless("SAMPNO", "Sample Number", "%8s", 5),
            unitless("BTLNBR", "Bottle Number", "%8s", 6),
            unitless("DATE", "Date", "%8s", 7),
            unitless("TIME", "Time", "%4s", 8),
            measured("LATITUDE", "Latitude", "%9.4f", 9, "degrees", "DEG", Some(-90.0), Some(90.0)),
            measured("LONGITUDE", "Longitude", "%9.4f", 10, "degrees", "DEG", Some(-180.0), Some(180.0)),
            measured("DEPTH", "Bottom Depth", "%6d", 11, "meters", "METERS", Some(0.0), Some(12000.0)),
            measured("CTDPRS", "CTD Pressure", "%9.1f", 12, "decibar", "DBAR", Some(0.0), Some(11000.0))
                .with_aliases(&["PRESSURE"]),
            measured("CTDRAW", "CTD Raw", "%9.1f", 13, "decibar", "DBAR", Some(0.0), Some(11000.0)),
            measured("CTDTMP", "CTD Temperature", "%9.4f", 14, "ITS-90 degrees Celsius", "ITS-90", Some(-3.0), Some(40.0)),
            measured("CTDSAL", "CTD Salinity", "%9.4f", 15, "Practical Salinity Scale 1978", "PSS-78", Some(0.0), Some(42.0)),
            measured("SALNTY", "Bottle Salinity", "%9.4f", 16, "Practical Salinity Scale 1978", "PSS-78", Some(0.0), Some(42.0))
                .with_aliases(&["BTLSAL"]),
            measured("CTDOXY", "CTD Oxygen", "%9.4f", 17, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(600.0)),
            measured("OXYGEN", "Bottle Oxygen", "%9.1f", 18, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(600.0))
                .with_aliases(&["BTLOXY"]),
            measured("SILCAT", "Silicate", "%9.2f", 19, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(300.0)),
            measured("NITRAT", "Nitrate", "%9.2f", 20, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(60.0)),
            measured("NITRIT", "Nitrite", "%9.2f", 21, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(10.0)),
            measured("PHSPHT", "Phosphate", "%9.2f", 22, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(5.0)),
            measured("DELC14", "Delta Carbon-14", "%9.1f", 23, "per mille", "/MILLE", Some(-1000.0), Some(500.0)),
            measured("DELC13", "Delta Carbon-13", "%9.2f", 24, "per mille", "/MILLE", Some(-20.0), Some(20.0)),
            measured("C14ERR", "Carbon-14 Error", "%9.1f", 25, "per mille", "/MILLE", Some(0.0), None),
            measured("TCARBN", "Total Carbon", "%9.1f", 26, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(3000.0)),
            measured("ALKALI", "Total Alkalinity", "%9.1f", 27, "micromole per kilogram", "UMOL/KG", Some(0.0), Some(3000.0)),
            unitless("PH_SWS", "pH (seawater scale)", "%9.4f", 28).with_bounds(Some(6.0), Some(9.0)),
        ] {
            registry.insert(parameter);
        }

        registry.insert_override(unitless("EXPOCODE", "ExpoCode", CONTRIVED_FORMAT, 1));
        registry.insert_override(unitless("SECT_ID", "Section ID", CONTRIVED_FORMAT, 2));
        registry.insert_override(
            unitless("CTDNOBS", "CTD Number of Observations", "%5s", UNORDERED)
                .with_aliases(&["NUMBER"]),
        );

        registry
    }
}

fn unitless(name: &str, full_name: &str, format: &str, display_order: u32) -> Parameter {
    Parameter::new(name)
        .with_full_name(full_name)
        .with_format(format)
        .with_display_order(display_order)
}

#[allow(clippy::too_many_arguments)]
fn measured(
    name: &str,
    full_name: &str,
    format: &str,
    display_order: u32,
    unit_name: &str,
    unit_mnemonic: &str,
    lower: Option<f64>,
    upper: Option<f64>,
) -> Parameter {
    unitless(name, full_name, format, display_order)
        .with_units(Unit::new(unit_name, unit_mnemonic))
        .with_bounds(lower, upper)
}
