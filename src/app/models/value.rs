//! Cell values held by columns
//!
//! Measurements are kept as [`Decimal`]s that remember how many decimal places
//! they were reported with, so that an encoder can reproduce `10.0001` or
//! `-999.000` exactly. The magnitude itself is an `f64`, so literals with more
//! than about 15 significant digits print rounded to the nearest double.
//! Other cells may be integers, free text or timestamps.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Accepted decimal literal: optional sign, digits with optional fraction, optional exponent
static DECIMAL_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.(\d*))?|\.(\d+))(?:[eE]([+-]?\d+))?$")
        .expect("decimal literal pattern is valid")
});

/// Most digits after the decimal point a literal may carry
///
/// Anything finer than the smallest subnormal `f64` has no magnitude left to print.
pub const MAX_DECIMAL_PLACES: u32 = 1074;

/// Error returned when text is not a decimal literal
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid decimal literal '{0}'")]
pub struct ParseDecimalError(pub String);

// =============================================================================
// Decimal
// =============================================================================

/// Numeric value with a tracked count of digits after the decimal point
///
/// Two decimals with the same magnitude but different precision (`2.0` and
/// `2.00`) are not equal: the printed form is part of the value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decimal {
    value: f64,
    places: u32,
}

impl Decimal {
    /// Create a decimal from a magnitude and a number of decimal places
    pub fn new(value: f64, places: u32) -> Self {
        Self { value, places }
    }

    /// Numeric magnitude
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Digits after the decimal point in the printed form
    pub fn places(&self) -> u32 {
        self.places
    }

    /// Same magnitude printed with a different precision
    pub fn with_places(self, places: u32) -> Self {
        Self { places, ..self }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let captures = DECIMAL_LITERAL
            .captures(text)
            .ok_or_else(|| ParseDecimalError(s.to_string()))?;

        let invalid = || ParseDecimalError(s.to_string());

        let fraction_digits = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map_or(Ok(0), |m| i64::try_from(m.as_str().len()))
            .map_err(|_| invalid())?;
        let exponent = match captures.get(3) {
            Some(m) => m.as_str().parse::<i64>().map_err(|_| invalid())?,
            None => 0,
        };

        let value = text.parse::<f64>().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        let places = fraction_digits
            .checked_sub(exponent)
            .ok_or_else(invalid)?
            .max(0);
        let places = u32::try_from(places)
            .ok()
            .filter(|places| *places <= MAX_DECIMAL_PLACES)
            .ok_or_else(invalid)?;

        Ok(Self { value, places })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.*}", self.places as usize, self.value)
    }
}

// =============================================================================
// Value
// =============================================================================

/// One present cell of a column; absence is modelled as `Option::None`
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Number with tracked precision
    Decimal(Decimal),
    /// Number whose printed precision is unknown
    Float(f64),
    /// Whole number (station, cast, sample identifiers)
    Integer(i64),
    /// Free text (expocodes, section ids)
    Text(String),
    /// Timestamp
    DateTime(NaiveDateTime),
}

impl Value {
    /// Parse a raw token as integer, decimal or text, in that order
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if let Ok(integer) = text.parse::<i64>() {
            return Value::Integer(integer);
        }
        match text.parse::<Decimal>() {
            Ok(decimal) => Value::Decimal(decimal),
            Err(_) => Value::Text(text.to_string()),
        }
    }

    /// Numeric magnitude, if the value is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => Some(d.value()),
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::Text(_) | Value::DateTime(_) => None,
        }
    }

    /// Whether the value is a number
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Printed decimal places, if tracked
    pub fn decimal_places(&self) -> Option<u32> {
        match self {
            Value::Decimal(d) => Some(d.places()),
            Value::Integer(_) => Some(0),
            Value::Float(_) | Value::Text(_) | Value::DateTime(_) => None,
        }
    }

    /// Normalized form used when comparing identifiers across files
    ///
    /// Station and cast "numbers" arrive as integers, decimals or padded text
    /// depending on the decoder; `574`, `574.0` and `" 574"` all normalize to `"574"`.
    pub fn key_part(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => normalize_number(d.value()),
            Value::Float(f) => normalize_number(*f),
            Value::Text(t) => {
                let trimmed = t.trim();
                match trimmed.parse::<f64>() {
                    Ok(number) if number.is_finite() => normalize_number(number),
                    _ => trimmed.to_string(),
                }
            }
            Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

fn normalize_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        (number as i64).to_string()
    } else {
        number.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Float(x) => write!(f, "{}", x),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(t) => write!(f, "{}", t),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

/// Render an optional cell the way diff reports show it
pub fn display_cell(cell: Option<&Value>) -> String {
    match cell {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_tracks_places() {
        let d: Decimal = "10.0001".parse().unwrap();
        assert_eq!(d.places(), 4);
        assert_eq!(d.to_string(), "10.0001");

        let fill: Decimal = "-999.000".parse().unwrap();
        assert_eq!(fill.places(), 3);
        assert_eq!(fill.to_string(), "-999.000");

        let whole: Decimal = "36".parse().unwrap();
        assert_eq!(whole.places(), 0);
    }

    #[test]
    fn test_decimal_exponent_shifts_places() {
        let d: Decimal = "1.25e-3".parse().unwrap();
        assert_eq!(d.places(), 5);
        assert!((d.value() - 0.00125).abs() < 1e-12);

        let big: Decimal = "1.5e3".parse().unwrap();
        assert_eq!(big.places(), 0);
        assert_eq!(big.to_string(), "1500");
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        assert!("abc".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_decimal_rejects_extreme_exponents() {
        for literal in [
            "1e-9223372036854775808",
            "1e99999999999999999999",
            "1e-2000",
            "1e400",
        ] {
            assert!(literal.parse::<Decimal>().is_err(), "{} parsed", literal);
            assert_eq!(Value::parse(literal), Value::Text(literal.to_string()));
        }

        let tiny: Decimal = "1.5e-300".parse().unwrap();
        assert_eq!(tiny.places(), 301);
    }

    #[test]
    fn test_decimal_prints_to_double_precision() {
        let exact: Decimal = "3.14159265358979".parse().unwrap();
        assert_eq!(exact.to_string(), "3.14159265358979");

        let long = "0.12345678901234567891";
        let rounded: Decimal = long.parse().unwrap();
        assert_eq!(rounded.places(), 20);
        assert_ne!(rounded.to_string(), long);
        assert!(rounded.to_string().starts_with("0.123456789012345"));
    }

    #[test]
    fn test_differently_precise_decimals_are_unequal() {
        let a: Decimal = "2.0".parse().unwrap();
        let b: Decimal = "2.00".parse().unwrap();
        assert_eq!(a.value(), b.value());
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse(" 574"), Value::Integer(574));
        assert_eq!(
            Value::parse("3.00"),
            Value::Decimal(Decimal::new(3.0, 2))
        );
        assert_eq!(Value::parse("316N145_9"), Value::Text("316N145_9".into()));
    }

    #[test]
    fn test_key_part_normalizes_station_numbers() {
        assert_eq!(Value::Integer(574).key_part(), "574");
        assert_eq!(Value::Float(574.0).key_part(), "574");
        assert_eq!(Value::Text(" 574 ".into()).key_part(), "574");
        assert_eq!(Value::Decimal(Decimal::new(574.0, 1)).key_part(), "574");
        assert_eq!(Value::Text("316N145_9".into()).key_part(), "316N145_9");
    }

    #[test]
    fn test_decimal_places_by_type() {
        assert_eq!(Value::Decimal(Decimal::new(1.0, 3)).decimal_places(), Some(3));
        assert_eq!(Value::Integer(1).decimal_places(), Some(0));
        assert_eq!(Value::Float(20.12355).decimal_places(), None);
    }
}
