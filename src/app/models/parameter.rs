//! Parameters and units
//!
//! A [`Parameter`] describes one measured quantity: its canonical WOCE
//! mnemonic, aliases, unit, display format, valid range and display order.

use crate::app::models::Value;
use crate::constants::{CONTRIVED_FORMAT, CONTRIVED_MARKER, FLAG_ENDING_IGOSS, FLAG_ENDING_WOCE, UNORDERED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of measure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Descriptive name (e.g. "micromole per kilogram")
    pub name: String,

    /// Mnemonic as written in file headers (e.g. "UMOL/KG")
    pub mnemonic: String,
}

impl Unit {
    /// Create a unit from a name and mnemonic
    pub fn new(name: impl Into<String>, mnemonic: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mnemonic: mnemonic.into(),
        }
    }

    /// Create a unit known only by its mnemonic
    pub fn from_mnemonic(mnemonic: impl Into<String>) -> Self {
        let mnemonic = mnemonic.into();
        Self {
            name: mnemonic.clone(),
            mnemonic,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)
    }
}

/// How a column's parameter came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ParameterOrigin {
    /// Name and unit as declared by a decoder, not yet resolved
    #[default]
    Declared,
    /// Resolved against the canonical registry
    Canonical,
    /// File-internal bookkeeping column, never resolved
    Contrived,
}

/// Description of a measured quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Canonical WOCE mnemonic, unique within a registry
    pub name: String,

    /// Human-readable name
    #[serde(default)]
    pub full_name: Option<String>,

    /// Alternative mnemonics that resolve to this parameter
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Unit of measure, if any
    #[serde(default)]
    pub units: Option<Unit>,

    /// printf-style display format (e.g. "%9.4f")
    #[serde(default = "default_format")]
    pub format: String,

    /// Inclusive lower bound for valid values
    #[serde(default)]
    pub bound_lower: Option<f64>,

    /// Inclusive upper bound for valid values
    #[serde(default)]
    pub bound_upper: Option<f64>,

    /// Position when columns are sorted for display
    #[serde(default = "default_display_order")]
    pub display_order: u32,

    /// Resolution state
    #[serde(skip)]
    pub origin: ParameterOrigin,
}

fn default_format() -> String {
    CONTRIVED_FORMAT.to_string()
}

fn default_display_order() -> u32 {
    UNORDERED
}

impl Parameter {
    /// Create a canonical parameter with default format and no bounds
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            full_name: None,
            aliases: Vec::new(),
            units: None,
            format: default_format(),
            bound_lower: None,
            bound_upper: None,
            display_order: UNORDERED,
            origin: ParameterOrigin::Canonical,
        }
    }

    /// Create a parameter as declared by a decoder, awaiting resolution
    ///
    /// Names carrying the contrived marker are marked contrived immediately.
    pub fn declared(name: impl Into<String>, units: Option<&str>) -> Self {
        let name = name.into();
        let origin = if is_contrived_name(&name) {
            ParameterOrigin::Contrived
        } else {
            ParameterOrigin::Declared
        };
        Self {
            full_name: Some(name.clone()),
            units: units
                .filter(|u| !u.trim().is_empty())
                .map(|u| Unit::from_mnemonic(u.trim())),
            origin,
            ..Self::new(name)
        }
    }

    /// Set the unit
    pub fn with_units(mut self, units: Unit) -> Self {
        self.units = Some(units);
        self
    }

    /// Set the display format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set inclusive bounds
    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bound_lower = lower;
        self.bound_upper = upper;
        self
    }

    /// Set the display order
    pub fn with_display_order(mut self, order: u32) -> Self {
        self.display_order = order;
        self
    }

    /// Add aliases
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Set the human-readable name
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// WOCE mnemonic used for column headers
    pub fn mnemonic_woce(&self) -> &str {
        &self.name
    }

    /// Unit mnemonic, if any
    pub fn units_mnemonic(&self) -> Option<&str> {
        self.units.as_ref().map(|u| u.mnemonic.as_str())
    }

    /// Whether the parameter bypasses registry resolution
    pub fn is_contrived(&self) -> bool {
        self.origin == ParameterOrigin::Contrived
    }

    /// Whether the parameter has been resolved against the registry
    pub fn is_canonical(&self) -> bool {
        self.origin == ParameterOrigin::Canonical
    }

    /// Check a value against the inclusive bounds; non-numeric values are always in range
    pub fn is_in_range(&self, value: &Value) -> bool {
        let Some(x) = value.as_f64() else {
            return true;
        };
        if let Some(lower) = self.bound_lower {
            if x < lower {
                return false;
            }
        }
        if let Some(upper) = self.bound_upper {
            if x > upper {
                return false;
            }
        }
        true
    }

    /// Whether this parameter answers to the given name
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.units {
            Some(units) => write!(f, "{} [{}]", self.name, units),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Whether a name carries the contrived marker
pub fn is_contrived_name(name: &str) -> bool {
    name.starts_with(CONTRIVED_MARKER)
}

/// Whether a name is a flag pseudo-column (`<P>_FLAG_W` or `<P>_FLAG_I`)
pub fn is_flag_name(name: &str) -> bool {
    name.ends_with(FLAG_ENDING_WOCE) || name.ends_with(FLAG_ENDING_IGOSS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Decimal;

    #[test]
    fn test_declared_contrived_parameter() {
        let p = Parameter::declared("_DATETIME", None);
        assert!(p.is_contrived());
        assert_eq!(p.format, "%11s");
        assert_eq!(p.display_order, UNORDERED);

        let q = Parameter::declared("CTDOXY", Some("UMOL/KG"));
        assert_eq!(q.origin, ParameterOrigin::Declared);
        assert_eq!(q.units_mnemonic(), Some("UMOL/KG"));
    }

    #[test]
    fn test_blank_declared_unit_is_none() {
        let p = Parameter::declared("STNNBR", Some("  "));
        assert!(p.units.is_none());
    }

    #[test]
    fn test_is_in_range_inclusive() {
        let p = Parameter::new("CTDSAL").with_bounds(Some(0.0), Some(42.0));
        assert!(p.is_in_range(&Value::Decimal(Decimal::new(42.0, 1))));
        assert!(p.is_in_range(&Value::Decimal(Decimal::new(0.0, 1))));
        assert!(!p.is_in_range(&Value::Decimal(Decimal::new(42.1, 1))));
        assert!(!p.is_in_range(&Value::Float(-0.5)));
        assert!(p.is_in_range(&Value::Text("abc".into())));
    }

    #[test]
    fn test_flag_names() {
        assert!(is_flag_name("PH_SWS_FLAG_W"));
        assert!(is_flag_name("CTDSAL_FLAG_I"));
        assert!(!is_flag_name("PH_SWS"));
    }

    #[test]
    fn test_registry_json_defaults() {
        let json = r#"{"name": "CTDPRS", "units": {"name": "decibar", "mnemonic": "DBAR"}}"#;
        let p: Parameter = serde_json::from_str(json).unwrap();
        assert_eq!(p.format, "%11s");
        assert_eq!(p.display_order, UNORDERED);
        assert_eq!(p.origin, ParameterOrigin::Declared);
    }
}
